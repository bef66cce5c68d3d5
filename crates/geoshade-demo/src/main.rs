use geoshade_demo::{DemoConfig, GeoShadeApp};
use geoshade_engine::device::GpuInit;
use geoshade_engine::logging::{init_logging, LoggingConfig};
use geoshade_engine::window::{Runtime, RuntimeConfig};

fn main() {
    init_logging(LoggingConfig::default());

    let app = GeoShadeApp::new(DemoConfig::default());
    if let Err(e) = Runtime::run(RuntimeConfig::default(), GpuInit::default(), app) {
        log::error!("{e:#}");
        std::process::exit(1);
    }
}
