//! different utility modules used throughout the project
/// terminal and file logging setup
pub mod logger;
/// parse document with structure like "key1: value1 \n key2: value2" into HashMap
pub mod task_parser;
/// wall-time accounting for the stages of a solve
pub mod timer;
