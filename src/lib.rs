//! Provisions the Kalliope voice assistant inside a Debian Docker container.
//!
//! The crate fetches a declarative assistant profile and its resource
//! repositories, merges the dependencies they declare with a baseline
//! package list, renders a Dockerfile from the merged data, and drives the
//! Docker lifecycle of the resulting image.
//!
//! # Architecture
//!
//! ```text
//! config ──► pipeline::stage_profile          (fetch + stage + accumulate)
//!                │
//!                ▼
//!         dockerfile::render                  (pure text synthesis)
//!                │
//!                ▼
//!         engine::{build_image, run_container, ...}
//! ```
//!
//! - **pipeline** - fetches the profile and resources, stages them into the
//!   Docker build context, accumulates extra package declarations
//! - **dockerfile** - deterministic Dockerfile rendering from package lists
//!   and build parameters
//! - **engine** - thin wrappers around the host `docker` binary
//! - **documents** - typed views of the profile/resource YAML documents
//! - **repo**, **audio** - external collaborators (git, NSS group database)
//!   behind substitutable traits

pub mod audio;
pub mod config;
pub mod dockerfile;
pub mod documents;
pub mod engine;
pub mod error;
pub mod fsops;
pub mod packages;
pub mod pipeline;
pub mod preflight;
pub mod repo;
pub mod shell;

pub use audio::{AudioGroupLookup, HostGroups};
pub use config::Config;
pub use dockerfile::{BuildParams, SpeechModelCatalog};
pub use error::{ProvisionError, Result};
pub use packages::PackageSet;
pub use pipeline::{Aggregation, CachePaths};
pub use repo::{repository_name, Fetch, GitCli};
