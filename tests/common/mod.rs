#![allow(dead_code)]

pub use assetflow_test_utils::builders;
pub use assetflow_test_utils::fake_executor;
pub use assetflow_test_utils::fake_jobs;
pub use assetflow_test_utils::fixtures;
pub use assetflow_test_utils::{init_tracing, with_timeout, write_tree};
