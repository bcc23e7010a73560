//! Declarative macros for the job DSL
//!
//! Thin shorthands over the builder API for the most common shapes.

/// Creates a job
///
/// `job!("name")` is [`Job::named`](crate::dsl::Job::named);
/// `job!("name", |job| { ... })` is [`Job::with`](crate::dsl::Job::with).
#[macro_export]
macro_rules! job {
    ($name:expr) => {
        $crate::dsl::Job::named($name)
    };
    ($name:expr, $block:expr) => {
        $crate::dsl::Job::with($name, $block)
    };
}

/// Creates a command line from its words
#[macro_export]
macro_rules! command_line {
    ($($word:expr),* $(,)?) => {
        vec![$(::std::string::String::from($word)),*]
    };
}
