// SPDX-FileCopyrightText: © 2026 Kubvernor authors
// SPDX-License-Identifier: GPL-3.0-only
// Copyright (C) 2026 Kubvernor authors.
//         This program is free software: you can redistribute it and/or modify it under the terms of the GNU General Public License as published by the Free Software Foundation, version 3.
//         This program is distributed in the hope that it will be useful, but WITHOUT ANY WARRANTY; without even the implied warranty of MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the GNU General Public License for more details.
//         You should have received a copy of the GNU General Public License along with this program. If not, see <https://www.gnu.org/licenses/>.
//
//

pub(crate) use clap::Parser;
use kubvernor_ingress::{Configuration, LoggingConfiguration};
use opentelemetry::trace::TracerProvider as _;
use opentelemetry_otlp::WithExportConfig;
use opentelemetry_sdk::trace::{RandomIdGenerator, Sampler, Tracer};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{
    filter::{self, EnvFilter},
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
    Layer, Registry,
};

pub enum Guard {
    Appender(WorkerGuard),
}

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
pub struct CommandArgs {
    #[arg(long)]
    with_config_file: String,
}

fn env_filter(variable: &str, default: &str) -> EnvFilter {
    EnvFilter::new(std::env::var(variable).unwrap_or_else(|_| default.to_owned()))
}

fn open_telemetry_tracer(service_name: &str, logging: &LoggingConfiguration) -> kubvernor_ingress::Result<Tracer> {
    let exporter = opentelemetry_otlp::SpanExporter::builder()
        .with_tonic()
        .with_endpoint(logging.open_telemetry_endpoint.clone())
        .with_timeout(logging.open_telemetry_timeout())
        .build()?;
    let tracer_provider = opentelemetry_sdk::trace::TracerProvider::builder()
        .with_batch_exporter(exporter, opentelemetry_sdk::runtime::Tokio)
        .with_id_generator(RandomIdGenerator::default())
        .with_sampler(Sampler::AlwaysOn)
        .with_resource(opentelemetry_sdk::Resource::new(vec![opentelemetry::KeyValue::new("service.name", service_name.to_owned())]))
        .build();
    Ok(tracer_provider.tracer(service_name.to_owned()))
}

fn init_tracing_logging(configuration: &Configuration) -> kubvernor_ingress::Result<Guard> {
    let logging = &configuration.logging;
    let (file_writer, guard) = tracing_appender::non_blocking(tracing_appender::rolling::never(&logging.log_directory, &logging.log_file));

    let console_layer = fmt::layer()
        .event_format(fmt::format().compact())
        .with_target(true)
        .with_span_events(FmtSpan::NONE)
        .with_ansi(false)
        .with_filter(filter::filter_fn(|meta| !meta.is_span()))
        .with_filter(env_filter("RUST_LOG", "debug"));
    let file_layer = fmt::layer()
        .with_writer(file_writer)
        .with_span_events(FmtSpan::NONE)
        .with_target(true)
        .with_ansi(false)
        .with_filter(filter::filter_fn(|meta| !meta.is_span()))
        .with_filter(env_filter("RUST_FILE_LOG", "debug"));

    // None disables the layer
    let telemetry_layer = match configuration.enable_open_telemetry {
        Some(true) => Some(
            tracing_opentelemetry::layer()
                .with_tracer(open_telemetry_tracer(&configuration.controller_name, logging)?)
                .with_filter(env_filter("RUST_TRACE_LOG", "info")),
        ),
        _ => None,
    };

    Registry::default().with(console_layer).with(file_layer).with(telemetry_layer).init();
    Ok(Guard::Appender(guard))
}

#[tokio::main(flavor = "multi_thread")]
async fn main() -> kubvernor_ingress::Result<()> {
    let args = CommandArgs::parse();
    let configuration: Configuration = serde_yaml::from_str(&std::fs::read_to_string(args.with_config_file)?)?;
    configuration.validate()?;
    let _guard = init_tracing_logging(&configuration)?;

    kubvernor_ingress::start(configuration).await
}
