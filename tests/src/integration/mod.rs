//! Integration flows across request verification and the assistant gateway.

pub mod support;

mod concurrency;
mod flows;
mod rejections;
