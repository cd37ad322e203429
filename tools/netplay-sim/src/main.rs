//! netplay-sim: run an authority and a client over a simulated latency link.
//!
//! Usage:
//!   netplay-sim duel --latency-ticks 6 --ticks 240
//!   netplay-sim duel --config client.toml --kind grenade --shots 3

use std::path::PathBuf;
use std::process;

use glam::DVec3;

use ordnance_core::config::SimConfig;
use ordnance_core::enums::{EffectKind, NetRole};
use ordnance_core::events::TickSummary;
use ordnance_core::kinds::ProjectileKind;
use ordnance_core::types::{ConnectionId, TeamId};
use ordnance_sim::world_setup;
use ordnance_sim::{LatencyLink, ObserverConnection, SimulationEngine, SpawnRequest};

const PLAYER: ConnectionId = ConnectionId(1);

fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));

    let json = matches!(std::env::var("LOG_FORMAT").as_deref(), Ok("json"));
    if json {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(false)
            .json()
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(false)
            .compact()
            .init();
    }
}

fn main() {
    init_tracing();
    let args: Vec<String> = std::env::args().collect();

    if args.len() < 2 {
        print_usage();
        process::exit(1);
    }

    match args[1].as_str() {
        "duel" => cmd_duel(&args[2..]),
        "help" | "--help" | "-h" => print_usage(),
        other => {
            eprintln!("Unknown command: {other}");
            print_usage();
            process::exit(1);
        }
    }
}

fn print_usage() {
    eprintln!(
        "netplay-sim: ORDNANCE authority/client projectile simulation\n\
         \n\
         Commands:\n\
         \n\
         duel      Fire at a target across a latency link and report both sides\n\
         \n\
           --config <path>        Client SimConfig TOML (optional)\n\
           --latency-ticks <N>    One-way latency in ticks (default: 4)\n\
           --ticks <N>            Ticks to simulate (default: 240)\n\
           --kind <name>          rocket | grenade | shock | flak | link | seeker (default: rocket)\n\
           --shots <N>            Shots fired, one every 30 ticks (default: 1)\n\
         \n\
         Set LOG_FORMAT=json for JSON logs and RUST_LOG to change the filter.\n"
    );
}

fn flag_value<'a>(args: &'a [String], flag: &str) -> Option<&'a str> {
    args.iter()
        .position(|a| a == flag)
        .and_then(|i| args.get(i + 1))
        .map(String::as_str)
}

fn parse_flag<T: std::str::FromStr>(args: &[String], flag: &str, default: T) -> T {
    match flag_value(args, flag) {
        Some(raw) => match raw.parse() {
            Ok(value) => value,
            Err(_) => {
                eprintln!("Error: invalid value for {flag}: {raw}");
                process::exit(1);
            }
        },
        None => default,
    }
}

fn parse_kind(name: &str) -> Option<ProjectileKind> {
    match name {
        "rocket" => Some(ProjectileKind::Rocket),
        "grenade" => Some(ProjectileKind::Grenade),
        "shock" => Some(ProjectileKind::ShockBall),
        "flak" => Some(ProjectileKind::FlakShard),
        "link" => Some(ProjectileKind::LinkBolt),
        "seeker" => Some(ProjectileKind::SeekingRocket),
        _ => None,
    }
}

fn cmd_duel(args: &[String]) {
    let client_config = match flag_value(args, "--config").map(PathBuf::from) {
        Some(path) => match SimConfig::from_toml_file(&path) {
            Ok(config) => config,
            Err(e) => {
                tracing::error!(path = %path.display(), error = %e, "failed to load config");
                process::exit(1);
            }
        },
        None => SimConfig::client(),
    };
    let latency_ticks: u64 = parse_flag(args, "--latency-ticks", 4);
    let ticks: u64 = parse_flag(args, "--ticks", 240);
    let shots: u64 = parse_flag(args, "--shots", 1);
    let kind_name = flag_value(args, "--kind").unwrap_or("rocket");
    let Some(kind) = parse_kind(kind_name) else {
        eprintln!("Error: unknown projectile kind: {kind_name}");
        process::exit(1);
    };

    let server_config = SimConfig {
        role: NetRole::Authority,
        headless: true,
        ..client_config.clone()
    };
    let mut server = SimulationEngine::new(server_config);
    server.add_observer(ObserverConnection::new(PLAYER, DVec3::ZERO));

    let mut client = SimulationEngine::new_client(client_config, PLAYER);
    let mut to_client = LatencyLink::new(PLAYER, latency_ticks);
    client.set_prediction_time(2.0 * to_client.one_way_secs());

    let shooter_pos = DVec3::new(0.0, 0.0, 42.0);
    let target_pos = DVec3::new(1200.0, 0.0, 42.0);
    let server_shooter = spawn_arena(&mut server, shooter_pos, target_pos);
    let client_shooter = spawn_arena(&mut client, shooter_pos, target_pos);
    let server_target = find_target(&server, target_pos);
    let client_target = find_target(&client, target_pos);

    tracing::info!(?kind, latency_ticks, ticks, shots, "duel started");

    let muzzle = shooter_pos + DVec3::new(60.0, 0.0, 20.0);
    let aim = (target_pos - muzzle).normalize();
    let mut pending_fire: Vec<u64> = Vec::new();
    let mut totals = DuelTotals::default();

    for tick in 0..ticks {
        if tick % 30 == 0 && tick / 30 < shots {
            let mut request = SpawnRequest::new(kind, client_shooter, muzzle, aim).from_connection(PLAYER);
            if let Some(target) = client_target.filter(|_| kind == ProjectileKind::SeekingRocket) {
                request = request.seeking(target);
            }
            match client.spawn_projectile(request) {
                Ok(_) => pending_fire.push(tick + latency_ticks),
                Err(e) => tracing::warn!(error = %e, "client fire rejected"),
            }
        }

        // Fire inputs arrive at the authority after one-way latency.
        let arrived = pending_fire.iter().filter(|at| **at == tick).count();
        pending_fire.retain(|at| *at != tick);
        for _ in 0..arrived {
            let mut request = SpawnRequest::new(kind, server_shooter, muzzle, aim).from_connection(PLAYER);
            if let Some(target) = server_target.filter(|_| kind == ProjectileKind::SeekingRocket) {
                request = request.seeking(target);
            }
            if let Err(e) = server.spawn_projectile(request) {
                tracing::warn!(error = %e, "authority fire rejected");
            }
        }

        let out = server.tick();
        let summary = TickSummary::from(&out);
        totals.damage += summary.damage_applied;
        totals.server_explosions += summary.explosions;
        totals.snapshots += summary.snapshots_sent;
        to_client.send(out.tick, &out.outbound);

        for snapshot in to_client.deliver(tick) {
            client.apply_snapshot(&snapshot);
        }
        let out = client.tick();
        totals.client_explosions += out.effect_count(EffectKind::Explosion);

        if summary.damage_applied > 0.0 || summary.explosions > 0 {
            match serde_json::to_string(&summary) {
                Ok(line) => tracing::info!(summary = %line, "authority tick"),
                Err(e) => tracing::warn!(error = %e, "failed to encode summary"),
            }
        }
    }

    tracing::info!(
        damage = totals.damage,
        server_explosions = totals.server_explosions,
        client_explosions = totals.client_explosions,
        snapshots = totals.snapshots,
        outstanding_fakes = client.outstanding_fakes(),
        "duel finished"
    );
}

#[derive(Debug, Default)]
struct DuelTotals {
    damage: f64,
    server_explosions: usize,
    client_explosions: usize,
    snapshots: usize,
}

/// Ground, shooter and target. Returns the shooter.
fn spawn_arena(engine: &mut SimulationEngine, shooter: DVec3, target: DVec3) -> hecs::Entity {
    let world = engine.world_mut();
    world_setup::spawn_ground(world, 0.0);
    world_setup::spawn_obstacle(world, DVec3::new(600.0, 400.0, 0.0), 150.0);
    world_setup::spawn_combatant(world, target, TeamId(1));
    world_setup::spawn_combatant(world, shooter, TeamId(0))
}

fn find_target(engine: &SimulationEngine, at: DVec3) -> Option<hecs::Entity> {
    engine
        .world()
        .query::<(&ordnance_core::components::Combatant, &ordnance_core::types::Position)>()
        .iter()
        .find(|(_, (_, pos))| pos.0 == at)
        .map(|(e, _)| e)
}
