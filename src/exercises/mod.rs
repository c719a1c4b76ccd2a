//! # 练习题目录
//!
//! 只读查询：按分类列出启用的练习题、按 ID 获取单个练习题

mod catalog;

pub use catalog::{ExerciseCatalog, ExerciseView};
