//! Parallel parsing support
//!
//! Parses of independent inputs share nothing but the read-only
//! [`Language`], so a batch of files can be spread over the rayon pool with
//! one [`Parser`] per input.
//!
//! # Feature Flag
//!
//! Work is only spread over threads when the `parallel` feature is enabled;
//! without it the same functions parse sequentially:
//!
//! ```toml
//! [dependencies]
//! signet = { version = "0.1", features = ["parallel"] }
//! ```
//!
//! # Example
//!
//! ```rust
//! use signet::engine::parse_batch_parallel;
//! use signet::ocaml_interface;
//!
//! let inputs = ["val x : int".as_bytes(), "type t = A | B".as_bytes(), "val".as_bytes()];
//! let results = parse_batch_parallel(ocaml_interface::language(), &inputs);
//!
//! // Results are in same order as inputs
//! assert_eq!(results.len(), 3);
//! assert!(results[2].as_ref().unwrap().has_error());
//! ```

use super::error::Result;
use super::language::Language;
use super::parser::{Parser, ParserConfig};
use super::tree::Tree;

#[cfg(feature = "rayon")]
use rayon::prelude::*;

/// Configuration for parallel parsing
#[derive(Debug, Clone)]
pub struct ParallelConfig {
    /// Number of threads to use (None = rayon's global pool)
    pub num_threads: Option<usize>,
    /// Minimum number of inputs handed to one task
    pub min_chunk_size: usize,
    /// Configuration for each parser
    pub parser: ParserConfig,
}

impl Default for ParallelConfig {
    fn default() -> Self {
        Self {
            num_threads: None,
            min_chunk_size: 1,
            parser: ParserConfig::default(),
        }
    }
}

impl ParallelConfig {
    /// Create a new configuration with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the number of threads to use
    pub fn with_num_threads(mut self, n: usize) -> Self {
        self.num_threads = Some(n);
        self
    }

    /// Set the minimum chunk size for parallel processing
    pub fn with_min_chunk_size(mut self, size: usize) -> Self {
        self.min_chunk_size = size.max(1);
        self
    }

    /// Set the configuration used by each parser
    pub fn with_parser_config(mut self, config: ParserConfig) -> Self {
        self.parser = config;
        self
    }
}

/// Parse multiple inputs in parallel
///
/// Returns one result per input, in input order.
pub fn parse_batch_parallel(language: &'static Language, inputs: &[&[u8]]) -> Vec<Result<Tree>> {
    parse_batch_with_config(language, inputs, &ParallelConfig::default())
}

/// Parse multiple inputs in parallel with explicit configuration
#[cfg(feature = "rayon")]
pub fn parse_batch_with_config(
    language: &'static Language,
    inputs: &[&[u8]],
    config: &ParallelConfig,
) -> Vec<Result<Tree>> {
    let parser_config = config.parser;
    let run = || -> Vec<Result<Tree>> {
        inputs
            .par_iter()
            .with_min_len(config.min_chunk_size)
            .map(|input| Parser::with_config(language, parser_config).parse(input, None))
            .collect()
    };

    match config.num_threads {
        Some(threads) => match rayon::ThreadPoolBuilder::new().num_threads(threads).build() {
            Ok(pool) => pool.install(run),
            Err(_) => {
                log_debug!("Could not build a {}-thread pool; using the global pool", threads);
                run()
            }
        },
        None => run(),
    }
}

/// Parse multiple inputs sequentially (fallback when rayon is not available)
#[cfg(not(feature = "rayon"))]
pub fn parse_batch_with_config(
    language: &'static Language,
    inputs: &[&[u8]],
    config: &ParallelConfig,
) -> Vec<Result<Tree>> {
    let mut parser = Parser::with_config(language, config.parser);
    inputs.iter().map(|input| parser.parse(input, None)).collect()
}
