//! Board State Fetching
//!
//! One `GET /state` per poll tick, decoded straight into `BoardState`.
//! Any failure leaves the previous presentation untouched; the board
//! degrades to stale-but-stable rather than crashing.

use crate::models::BoardState;
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::JsFuture;
use web_sys::{Request, RequestInit, Response};

const STATE_URL: &str = "/state";

/// Fetch and decode the current board snapshot.
pub async fn fetch_state() -> Result<BoardState, String> {
    let window = web_sys::window().ok_or("no window available")?;

    let opts = RequestInit::new();
    opts.set_method("GET");
    let request = Request::new_with_str_and_init(STATE_URL, &opts)
        .map_err(|e| format!("bad request: {:?}", e))?;
    request
        .headers()
        .set("Accept", "application/json")
        .map_err(|e| format!("bad header: {:?}", e))?;

    let response = JsFuture::from(window.fetch_with_request(&request))
        .await
        .map_err(|e| format!("fetch failed: {:?}", e))?;
    let response: Response = response
        .dyn_into()
        .map_err(|_| "fetch did not yield a response".to_string())?;

    if response.status() != 200 {
        return Err(format!("board responded with status {}", response.status()));
    }

    let json = JsFuture::from(response.json().map_err(|e| format!("bad body: {:?}", e))?)
        .await
        .map_err(|e| format!("body read failed: {:?}", e))?;

    serde_wasm_bindgen::from_value(json).map_err(|e| format!("decode failed: {}", e))
}
