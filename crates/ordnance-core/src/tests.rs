#[cfg(test)]
mod tests {
    use glam::DVec3;

    use crate::config::SimConfig;
    use crate::enums::*;
    use crate::error::ConfigError;
    use crate::kinds::ProjectileKind;
    use crate::net::{ProjectileSnapshot, ReplicationState};
    use crate::types::*;

    // ---- Kind catalogue ----

    #[test]
    fn test_point_damage_kinds_have_no_radius() {
        for kind in [ProjectileKind::FlakShard, ProjectileKind::LinkBolt] {
            let dmg = kind.damage_params();
            assert_eq!(dmg.outer_radius, 0.0, "{kind:?} should deal point damage");
            assert_eq!(dmg.radial_damage_at(0.0), 0.0);
        }
    }

    #[test]
    fn test_forced_push_kinds() {
        // Blast radius or very high speed.
        assert!(ProjectileKind::Rocket.needs_forced_push());
        assert!(ProjectileKind::Grenade.needs_forced_push());
        assert!(ProjectileKind::ShockBall.needs_forced_push());
        assert!(ProjectileKind::LinkBolt.needs_forced_push());
        // Slow-ish point damage.
        assert!(!ProjectileKind::FlakShard.needs_forced_push());
    }

    #[test]
    fn test_gravity_kinds() {
        assert!(ProjectileKind::Grenade.is_gravity_affected());
        assert!(ProjectileKind::FlakShard.is_gravity_affected());
        assert!(!ProjectileKind::Rocket.is_gravity_affected());
        assert!(!ProjectileKind::LinkBolt.is_gravity_affected());
    }

    #[test]
    fn test_only_shock_ball_is_shootable() {
        let shootable: Vec<_> = ProjectileKind::ALL
            .iter()
            .filter(|k| k.is_shootable())
            .collect();
        assert_eq!(shootable, vec![&ProjectileKind::ShockBall]);
    }

    #[test]
    fn test_radial_damage_falloff() {
        let dmg = ProjectileKind::Rocket.damage_params();

        assert!((dmg.radial_damage_at(0.0) - 100.0).abs() < 1e-10);
        assert!((dmg.radial_damage_at(15.0) - 100.0).abs() < 1e-10);
        assert!((dmg.radial_damage_at(360.0) - 20.0).abs() < 1e-10);
        assert_eq!(dmg.radial_damage_at(361.0), 0.0);

        // Linear falloff halfway between inner and outer radius.
        let mid = 15.0 + (360.0 - 15.0) / 2.0;
        assert!((dmg.radial_damage_at(mid) - 60.0).abs() < 1e-9);

        // Monotonic non-increasing.
        let mut last = f64::MAX;
        for step in 0..=36 {
            let d = dmg.radial_damage_at(step as f64 * 10.0);
            assert!(d <= last);
            assert!(d >= dmg.minimum_damage);
            last = d;
        }
    }

    #[test]
    fn test_max_lifespan_covers_every_kind() {
        let max = ProjectileKind::max_lifespan_secs();
        assert_eq!(max, 10.0);
        for kind in ProjectileKind::ALL {
            assert!(kind.movement_params().lifespan_secs <= max, "{kind:?}");
        }
    }

    // ---- Types ----

    #[test]
    fn test_rotation_faces_velocity() {
        let rot = Rotation::facing(DVec3::new(0.0, 10.0, 0.0));
        let forward = rot.0 * DVec3::X;
        assert!((forward - DVec3::Y).length() < 1e-9);

        let rest = Rotation::facing(DVec3::ZERO);
        assert_eq!(rest.0, glam::DQuat::IDENTITY);
    }

    #[test]
    fn test_sim_time_advance() {
        let mut time = SimTime::default();
        for _ in 0..crate::constants::TICK_RATE {
            time.advance();
        }
        assert_eq!(time.tick, 60);
        assert!((time.elapsed_secs - 1.0).abs() < 1e-10);
    }

    // ---- Protocol ----

    #[test]
    fn test_snapshot_serde() {
        let snap = ProjectileSnapshot {
            net_id: NetId(7),
            kind: ProjectileKind::Rocket,
            state: ReplicationState {
                position: Position::new(1.0, 2.0, 3.0),
                rotation: Rotation::facing(DVec3::X),
                velocity: Velocity::new(2700.0, 0.0, 0.0),
            },
            team: Some(TeamId(1)),
            owner_connection: None,
            exploded: false,
            finalized: false,
        };
        let json = serde_json::to_string(&snap).unwrap();
        assert!(!json.contains("owner_connection"));
        let back: ProjectileSnapshot = serde_json::from_str(&json).unwrap();
        assert_eq!(snap, back);
    }

    // ---- Config ----

    #[test]
    fn test_config_partial_toml() {
        let config = SimConfig::from_toml_str(
            r#"
            role = "Client"
            headless = false
            fake_policy = "MoveAuthoritativeToFake"
            "#,
        )
        .unwrap();
        assert_eq!(config.role, NetRole::Client);
        assert_eq!(config.fake_policy, FakePolicy::MoveAuthoritativeToFake);
        assert!(!config.friendly_fire);
        assert_eq!(config.seed, 42);
        assert!((config.shutdown_grace_secs() - 1.0).abs() < 1e-10);
    }

    #[test]
    fn test_config_rejects_invalid() {
        let err = SimConfig::from_toml_str("net_update_interval_ticks = 0").unwrap_err();
        assert!(matches!(
            err,
            ConfigError::Invalid {
                field: "net_update_interval_ticks",
                ..
            }
        ));

        let err = SimConfig::from_toml_str("max_prediction_time = -0.5").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { .. }));

        let err = SimConfig::from_toml_str("role = \"Spectator\"").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }
}
