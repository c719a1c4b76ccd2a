//! # 提交记录
//!
//! 每个 (账户, 练习题) 组合只保留一条当前记录，重复提交原地覆盖

mod recorder;

pub use recorder::{SubmissionRecorder, SubmissionView};
