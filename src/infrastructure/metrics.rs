// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use metrics::{describe_counter, describe_histogram};
use metrics_exporter_prometheus::PrometheusBuilder;
use std::net::SocketAddr;
use tracing::{info, warn};

/// 初始化指标系统
///
/// 启动 Prometheus 导出器并注册应用所需的各类监控指标。
/// 地址无效或端口被占用时只记录警告，不影响主服务启动。
pub fn init_metrics(listen_addr: &str) {
    let addr: SocketAddr = match listen_addr.parse() {
        Ok(addr) => addr,
        Err(e) => {
            warn!("Invalid metrics address {}: {}. Metrics exporter disabled.", listen_addr, e);
            return;
        }
    };

    if let Err(e) = PrometheusBuilder::new().with_http_listener(addr).install() {
        warn!("Failed to install Prometheus recorder: {}. This might happen if the port is already in use.", e);
        return;
    }

    describe_counter!(
        "attendrs_extractions_total",
        "Total number of extraction requests by outcome"
    );
    describe_histogram!(
        "attendrs_extraction_duration_seconds",
        "End-to-end duration of extraction requests in seconds"
    );
    describe_counter!(
        "attendrs_upstream_requests_total",
        "Total number of upstream model calls by HTTP status"
    );
    describe_histogram!(
        "attendrs_upstream_latency_seconds",
        "Latency of individual upstream model calls in seconds"
    );
    describe_counter!(
        "attendrs_tokens_total",
        "Tokens reported by the upstream model, by kind"
    );

    info!("Metrics exporter listening on {}", addr);
}
