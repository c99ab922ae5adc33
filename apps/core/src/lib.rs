pub mod action_executor;
pub mod backend;
pub mod config;
pub mod contract;
pub mod debounce;
pub mod discovery;
pub mod dispatcher;
pub mod icons;
pub mod index_store;
pub mod index_tracker;
pub mod local_backend;
pub mod logging;
pub mod model;
pub mod normalize;
pub mod runtime;
pub mod search;
pub mod selection;
pub mod session;
pub mod transport;

#[cfg(test)]
mod tests {
    mod query_latency_test {
        include!(concat!(
            env!("CARGO_MANIFEST_DIR"),
            "/../../tests/perf/query_latency_test.rs"
        ));
    }
}
