//! Route listing and registration.

use std::fs;

use clap::Args;
use console::style;

use nextbus_core::{RouteCode, RouteDescriptor};

use super::{build_service, config_path, load_config};

/// Arguments for the register command.
#[derive(Args)]
pub struct RegisterArgs {
    /// Short route code (e.g., "X28")
    route: String,

    /// Upstream line id, URL-encoded (e.g., "dub:01X28:%20:H:y08")
    line_id: String,

    /// Upstream line name, URL-encoded (e.g., "bus%20X28")
    line_name: String,
}

pub fn list(config: Option<&str>) -> anyhow::Result<()> {
    let service = build_service(config)?;
    println!("{}", service.list_routes());
    Ok(())
}

pub fn register(args: RegisterArgs, config: Option<&str>) -> anyhow::Result<()> {
    let code = RouteCode::parse(&args.route)?;

    let service = build_service(config)?;
    println!("{}", service.register_route(code.as_str(), &args.line_id, &args.line_name));

    // Persist so later invocations see the route.
    let path = config_path(config);
    let mut stored = load_config(&path)?;
    stored.upsert_route(RouteDescriptor::new(code, args.line_id.trim(), args.line_name.trim()));

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    stored.save(&path)?;

    println!(
        "{} Saved route to {}",
        style("✓").green(),
        path.display()
    );

    Ok(())
}
