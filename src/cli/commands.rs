//! Command handlers: one client call, optional local filtering, then output.

use gnet::{Client, QuakeSearch};

use super::output::{HealthReport, Output};
use super::{CliError, ListArgs, QuakeCommand, StrongMotionArgs, VolcanoCommand};

pub async fn quake(client: &Client, command: &QuakeCommand, out: &Output) -> Result<(), CliError> {
    match command {
        QuakeCommand::List(args) => list(client, args, out).await,
        QuakeCommand::Get { id } => out.emit(&client.get_quake(id).await?.into_inner()),
        QuakeCommand::History { id } => {
            out.emit(&client.get_quake_history(id).await?.into_inner())
        }
        QuakeCommand::Stats => out.emit(&client.get_quake_stats().await?.into_inner()),
        QuakeCommand::Health => {
            let latency = client.health_check().await?;
            out.emit(&HealthReport {
                base_url: client.config().base_url.to_string(),
                status: "ok",
                latency_ms: u64::try_from(latency.as_millis()).unwrap_or(u64::MAX),
            })
        }
        QuakeCommand::Intensity(args) => {
            let intensity = client
                .get_intensity(args.kind, args.public_id.as_deref(), args.aggregation)
                .await?;
            out.emit(&intensity.into_inner())
        }
        QuakeCommand::StrongMotion(args) => strong_motion(client, args, out).await,
        QuakeCommand::CapFeed => out.emit(&client.get_cap_feed().await?.into_inner()),
        QuakeCommand::CapAlert { id } => out.emit_raw(&client.get_cap_alert(id).await?.into_inner()),
    }
}

pub async fn volcano(
    client: &Client,
    command: &VolcanoCommand,
    out: &Output,
) -> Result<(), CliError> {
    match command {
        VolcanoCommand::Alerts { volcano, min_level } => {
            let alerts = client.get_volcano_alerts(volcano.as_deref()).await?.into_inner();
            let alerts = match min_level {
                Some(level) => alerts.at_least(*level),
                None => alerts,
            };
            out.emit(&alerts)
        }
        VolcanoCommand::Quakes {
            id,
            limit,
            min_magnitude,
        } => {
            let quakes = client.get_volcano_quakes(id, *min_magnitude, *limit).await?;
            out.emit(&quakes.into_inner())
        }
    }
}

/// `--mmi` goes to the server; every other criterion is applied locally.
async fn list(client: &Client, args: &ListArgs, out: &Output) -> Result<(), CliError> {
    let search = QuakeSearch {
        min_magnitude: args.min_magnitude,
        max_magnitude: args.max_magnitude,
        min_mmi: args.min_mmi,
        max_mmi: args.max_mmi,
        limit: Some(args.limit),
    };
    search.validate()?;

    let quakes = match args.mmi {
        Some(mmi) => search.apply(client.get_quakes(Some(mmi), None).await?.into_inner()),
        None => client.search_quakes(&search).await?.into_inner(),
    };
    out.emit(&quakes)
}

async fn strong_motion(
    client: &Client,
    args: &StrongMotionArgs,
    out: &Output,
) -> Result<(), CliError> {
    let mut stations = client.get_strong_motion(&args.id).await?.into_inner();

    if let Some(network) = &args.network {
        stations = stations.by_network(network);
    }
    if let Some(min_mmi) = args.min_mmi {
        stations = stations.with_min_mmi(min_mmi);
    }
    if let Some(max_distance) = args.max_distance {
        stations = stations.within_distance(max_distance);
    }
    out.emit(&stations)
}
