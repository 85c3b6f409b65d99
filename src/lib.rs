//! Core library for the social-merge command line application.
//!
//! The library merges several independently authored social media
//! annotation workbooks into one dataset with run-wide post and comment
//! identifiers. Source and sink adapters live under [`social::merge::io`],
//! data representations inside [`social::merge::model`], identifier
//! unification in [`social::merge::unify`], schema rules and aggregation in
//! [`social::merge::normalize`] and [`social::merge::aggregate`], and the run
//! orchestration under [`social::merge::pipeline`].

pub mod social;

pub use social::merge::{
    MergeError, Result, aggregate, config, error, io, keys, model, normalize, pipeline, unify,
};
