mod common;

use battle_core::env::{PiercingSpec, ProjectileSpec};
use battle_core::{
    ActionId, BattleRequest, Battler, BattlerKind, CollisionShape, Direction, Position,
    SkillDefinition, SkillFlags, SkillId,
};
use common::{ENEMY, Harness, PLAYER, sturdy};

const SLASH: SkillId = SkillId(1);
const BOLT: SkillId = SkillId(2);
const TRAP: SkillId = SkillId(3);

fn arena(skill: SkillDefinition, damage: i32) -> Harness {
    let mut harness = Harness::new();
    harness.stats.damage.insert(skill.id, damage);
    harness.catalog.insert_skill(skill);
    harness
        .state
        .add_battler(Battler::new(PLAYER, BattlerKind::Player, Position::new(5, 5)));
    harness.state.add_battler(
        Battler::new(ENEMY, BattlerKind::Enemy, Position::new(5, 6)).with_facing(Direction::Up),
    );
    harness.stats.set(PLAYER, sturdy(3));
    harness.stats.set(ENEMY, sturdy(3));
    harness
}

fn cast_at(harness: &mut Harness, skill: SkillId, target: Option<Position>) -> ActionId {
    harness
        .with_engine(|engine, world| engine.force_action(world, PLAYER, skill, false, target))
        .expect("forced cast should spawn")
}

#[test]
fn single_hit_action_is_flagged_then_despawned() {
    let mut harness = arena(
        SkillDefinition {
            duration: 3,
            ..SkillDefinition::new(SLASH, "Slash")
        },
        10,
    );
    let id = cast_at(&mut harness, SLASH, None);

    let first = harness.step();
    assert_eq!(first.hits.len(), 1);
    let action = harness.state.action(id).unwrap();
    assert_eq!(action.piercing_hits_remaining(), 0);
    assert!(!action.needs_removal());

    let second = harness.step();
    assert!(second.hits.is_empty());
    assert!(harness.state.action(id).unwrap().needs_removal());
    assert!(second.despawned.is_empty());

    let third = harness.step();
    assert_eq!(third.despawned, vec![id]);
    assert!(harness.state.action(id).is_none());
    assert_eq!(harness.stats.hp(ENEMY), 90);
}

#[test]
fn piercing_actions_wait_between_hits() {
    let mut harness = arena(
        SkillDefinition {
            duration: 10,
            piercing: PiercingSpec { hits: 3, delay: 1 },
            ..SkillDefinition::new(SLASH, "Flurry")
        },
        5,
    );
    cast_at(&mut harness, SLASH, None);

    let hit_frames: Vec<u64> = harness
        .run(8)
        .into_iter()
        .filter(|report| !report.hits.is_empty())
        .map(|report| report.frame)
        .collect();

    assert_eq!(hit_frames, vec![1, 3, 5]);
    assert_eq!(harness.stats.hp(ENEMY), 85);
}

#[test]
fn delayed_action_hits_after_its_delay() {
    let mut harness = arena(
        SkillDefinition {
            delay: 2,
            ..SkillDefinition::new(SLASH, "Heavy Slash")
        },
        10,
    );
    cast_at(&mut harness, SLASH, None);

    let reports = harness.run(3);
    assert!(reports[0].hits.is_empty());
    assert!(reports[1].hits.is_empty());
    assert_eq!(reports[2].hits.len(), 1);
}

#[test]
fn touch_trigger_cuts_the_delay_short() {
    let mut harness = arena(
        SkillDefinition {
            delay: 10,
            flags: SkillFlags::TOUCH_TRIGGER,
            ..SkillDefinition::new(TRAP, "Snare")
        },
        7,
    );
    let id = cast_at(&mut harness, TRAP, Some(Position::new(10, 10)));

    let idle = harness.step();
    assert!(idle.hits.is_empty());
    assert_eq!(harness.state.action(id).unwrap().delay_remaining(), 9);

    harness.with_engine(|engine, _| engine.place_battler(ENEMY, Position::new(10, 11)));
    let sprung = harness.step();

    assert_eq!(sprung.hits.len(), 1);
    assert_eq!(sprung.hits[0].target, ENEMY);
    assert_eq!(harness.stats.hp(ENEMY), 93);
}

#[test]
fn projectile_travels_one_tile_per_period() {
    let mut harness = arena(
        SkillDefinition {
            range: 0.0,
            duration: 20,
            projectile: Some(ProjectileSpec { frames_per_tile: 1 }),
            ..SkillDefinition::new(BOLT, "Bolt")
        },
        12,
    );
    harness.with_engine(|engine, _| engine.place_battler(ENEMY, Position::new(5, 9)));
    let id = cast_at(&mut harness, BOLT, None);

    let reports = harness.run(4);

    assert!(reports[..3].iter().all(|report| report.hits.is_empty()));
    assert_eq!(reports[3].hits.len(), 1);
    assert_eq!(harness.state.action(id).unwrap().position(), Position::new(5, 9));
}

#[test]
fn blocked_projectile_is_spent_without_hitting() {
    let mut harness = arena(
        SkillDefinition {
            range: 0.0,
            duration: 20,
            projectile: Some(ProjectileSpec { frames_per_tile: 1 }),
            ..SkillDefinition::new(BOLT, "Bolt")
        },
        12,
    );
    harness.with_engine(|engine, _| engine.place_battler(ENEMY, Position::new(5, 9)));
    harness.map.set_blocked(Position::new(5, 7), true);
    let id = cast_at(&mut harness, BOLT, None);

    let reports = harness.run(4);

    assert!(reports.iter().all(|report| report.hits.is_empty()));
    assert_eq!(reports[3].despawned, vec![id]);
    assert_eq!(harness.stats.hp(ENEMY), 100);
}

#[test]
fn clear_request_flags_everything_for_the_next_cleanup() {
    let mut harness = arena(
        SkillDefinition {
            duration: 30,
            ..SkillDefinition::new(SLASH, "Lingering Slash")
        },
        0,
    );
    let id = cast_at(&mut harness, SLASH, Some(Position::new(15, 15)));
    harness.with_engine(|engine, _| engine.request(BattleRequest::ClearActions));

    harness.step();
    assert!(harness.state.action(id).unwrap().needs_removal());

    let report = harness.step();
    assert_eq!(report.despawned, vec![id]);
    assert!(harness.state.actions().is_empty());
}

#[test]
fn minimum_lifetime_keeps_instant_actions_around() {
    let mut harness = arena(
        SkillDefinition {
            duration: 0,
            shape: CollisionShape::Circle,
            ..SkillDefinition::new(SLASH, "Flash")
        },
        10,
    );
    harness.config.min_action_lifetime = 3;
    let id = cast_at(&mut harness, SLASH, Some(Position::new(12, 12)));

    harness.run(2);
    harness.with_engine(|engine, _| engine.place_battler(ENEMY, Position::new(12, 13)));
    let third = harness.step();
    assert_eq!(third.hits.len(), 1, "still collides on its third active frame");

    let fourth = harness.step();
    assert!(fourth.hits.is_empty());
    assert!(harness.state.action(id).unwrap().needs_removal());
    assert_eq!(harness.step().despawned, vec![id]);
}
