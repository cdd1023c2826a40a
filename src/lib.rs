#![forbid(unsafe_code)]

//! Batch downloader for GFAS v1.2 wildfire emission files.
//!
//! A batch walks a year × month × parameter grid and, for every cell, builds
//! an archive request (one whole month of daily fields for one parameter)
//! and hands it to a [`Retrieve`] implementation, which writes
//! `GFASv1.2_<year>_<month>_<code>.nc` into a per-year directory.
//!
//! Two archives are supported: the Copernicus Data Store, which names
//! variables semantically, and ECMWF MARS through the Web API, which uses
//! GRIB parameter codes.
//!
//! ```no_run
//! use gfas_fetch::{ApiClient, Archive, BatchConfig, ClientOptions};
//!
//! let mut config = BatchConfig::defaults(Archive::Cds);
//! config.years = [2003, 2003];
//! config.parameters = vec!["CO".to_string(), "FRP".to_string()];
//!
//! let client = ApiClient::from_env(config.archive, ClientOptions::default())?;
//! let report = gfas_fetch::run(&config, &client)?;
//! print!("{report}");
//! # Ok::<(), gfas_fetch::Error>(())
//! ```
//!
//! Notes:
//! - Month lengths use the divisible-by-4 leap rule, which is wrong for
//!   century years such as 2100; see [`date::days_in_month`].
//! - Requests run strictly one after another.

pub mod archive;
pub mod batch;
pub mod catalog;
mod client;
pub mod config;
mod credentials;
pub mod date;
pub mod directory;
mod error;
pub mod request;
mod url_builder;

pub use crate::archive::Archive;
pub use crate::batch::{run, BatchReport, RequestKey};
pub use crate::catalog::{Catalog, Parameter};
pub use crate::client::{ApiClient, ClientOptions, DryRun, Retrieve, Retrieved};
pub use crate::config::{BatchConfig, ErrorPolicy, Overrides};
pub use crate::credentials::Credentials;
pub use crate::error::{Error, Result};
pub use crate::request::{DownloadRequest, Payload, RequestBuilder};
