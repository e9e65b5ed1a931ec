//! Process and runtime gauges, sampled on every metrics export.

use std::sync::{Arc, Mutex};

use opentelemetry::metrics::{Meter, ObservableGauge};
use sysinfo::System;

/// Keeps the gauge handles alive for the lifetime of the meter provider.
pub(super) struct ProcessGauges {
    _process_memory: ObservableGauge<u64>,
    _system_memory: ObservableGauge<u64>,
    _system_cpu: ObservableGauge<f64>,
    _runtime_tasks: Option<ObservableGauge<u64>>,
}

pub(super) fn register(meter: &Meter) -> ProcessGauges {
    let system = Arc::new(Mutex::new(System::new()));
    let pid = sysinfo::get_current_pid().ok();

    let sys = system.clone();
    let process_memory = meter
        .u64_observable_gauge("process.memory.usage")
        .with_description("Resident memory of the service process")
        .with_unit("By")
        .with_callback(move |observer| {
            let Some(pid) = pid else { return };
            if let Ok(mut sys) = sys.lock() {
                if sys.refresh_process(pid) {
                    if let Some(process) = sys.process(pid) {
                        observer.observe(process.memory(), &[]);
                    }
                }
            }
        })
        .build();

    let sys = system.clone();
    let system_memory = meter
        .u64_observable_gauge("system.memory.usage")
        .with_description("Memory in use on the host")
        .with_unit("By")
        .with_callback(move |observer| {
            if let Ok(mut sys) = sys.lock() {
                sys.refresh_memory();
                observer.observe(sys.used_memory(), &[]);
            }
        })
        .build();

    // CPU usage is a delta between refreshes; the first sample reads zero.
    let sys = system;
    let system_cpu = meter
        .f64_observable_gauge("system.cpu.utilization")
        .with_description("Host CPU usage in percent")
        .with_unit("%")
        .with_callback(move |observer| {
            if let Ok(mut sys) = sys.lock() {
                sys.refresh_cpu();
                observer.observe(f64::from(sys.global_cpu_info().cpu_usage()), &[]);
            }
        })
        .build();

    let runtime_tasks = tokio::runtime::Handle::try_current().ok().map(|handle| {
        meter
            .u64_observable_gauge("runtime.tokio.alive_tasks")
            .with_description("Tasks alive on the tokio runtime")
            .with_callback(move |observer| {
                observer.observe(handle.metrics().num_alive_tasks() as u64, &[]);
            })
            .build()
    });

    ProcessGauges {
        _process_memory: process_memory,
        _system_memory: system_memory,
        _system_cpu: system_cpu,
        _runtime_tasks: runtime_tasks,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use opentelemetry::metrics::MeterProvider;
    use opentelemetry_sdk::metrics::SdkMeterProvider;

    #[tokio::test]
    async fn test_registers_runtime_gauge_inside_tokio() {
        let provider = SdkMeterProvider::builder().build();
        let gauges = register(&provider.meter("test"));

        assert!(gauges._runtime_tasks.is_some());
    }

    #[test]
    fn test_skips_runtime_gauge_outside_tokio() {
        let provider = SdkMeterProvider::builder().build();
        let gauges = register(&provider.meter("test"));

        assert!(gauges._runtime_tasks.is_none());
    }
}
