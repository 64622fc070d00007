//! Generic HTTP request layer with per-attempt timeout and bounded, linearly backed-off retry.
//!
//! Every call resolves to an [`ApiResult`]; errors never escape the client as panics or `Err`.

mod client;
mod result;

pub use client::{
    HttpClient, HttpError, RequestOptions, ResponseBody, Sleeper, TokioSleeper,
};
pub use result::ApiResult;
