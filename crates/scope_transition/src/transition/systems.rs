//! Transition systems (PostUpdate после transform propagation, один run = один display tick)
//!
//! Порядок (chain, см. ScopeTransitionPlugin):
//! 1. begin_scope_transitions — Zone Monitor gate
//! 2. cancel_scope_transitions — внешняя отмена
//! 3. tick_dwell_timers — check-before-suspend, overlap → abort / elapsed
//! 4. commit_view_locks — View-Lock Committer
//! 5. log_transition_events — diagnostic sink

use bevy::prelude::*;

use super::commit::{commit_view_lock, BevyScopeScene};
use super::events::{
    CancelReason, CancelScopeTransition, DwellElapsed, ScopeTransitionEvent, ZoneOverlapBegan,
};
use super::state::{DwellPoll, TransitionState};
use crate::components::{volumes_overlap, BoundingVolume, ScopeZone};
use crate::config::ScopeTransitionConfig;
use crate::layers::LayerRegistry;
use crate::logger;

/// Система: Zone Monitor
///
/// Valid overlap-begin (Idle + bound observer) → Transitioning.
/// Всё остальное — silent no-op: повторный вход, вход во время dwell'а,
/// вход после lock'а, чужой объект. Несколько событий за один frame
/// проходят через тот же gate → максимум один dwell task.
pub fn begin_scope_transitions(
    mut overlaps: EventReader<ZoneOverlapBegan>,
    mut zones: Query<(&ScopeZone, &mut TransitionState)>,
    time: Res<Time>,
    mut outcomes: EventWriter<ScopeTransitionEvent>,
) {
    let now = time.elapsed();

    for overlap in overlaps.read() {
        let Ok((zone, mut state)) = zones.get_mut(overlap.zone) else {
            continue;
        };

        // No-op gate не должен помечать TransitionState changed
        if state
            .bypass_change_detection()
            .try_begin(zone, overlap.other, now)
        {
            state.set_changed();
            outcomes.write(ScopeTransitionEvent::Started {
                zone: overlap.zone,
                observer: overlap.other,
            });
        }
    }
}

/// Система: внешняя отмена dwell'а (abort path)
pub fn cancel_scope_transitions(
    mut cancels: EventReader<CancelScopeTransition>,
    mut zones: Query<&mut TransitionState, With<ScopeZone>>,
    mut outcomes: EventWriter<ScopeTransitionEvent>,
) {
    for cancel in cancels.read() {
        let Ok(mut state) = zones.get_mut(cancel.zone) else {
            continue;
        };

        if !state.is_transitioning() {
            continue;
        }

        state.abort();
        outcomes.write(ScopeTransitionEvent::Canceled {
            zone: cancel.zone,
            reason: CancelReason::External,
        });
    }
}

/// Система: Dwell Timer tick
///
/// Для каждой зоны в Transitioning:
/// - свежая bounds проверка observer ↔ zone в world space (не identity)
/// - overlap потерян → Idle + Canceled
/// - deadline достигнут → DwellElapsed (commit в следующей системе chain'а)
/// - иначе ждём следующий frame
///
/// Наблюдатель без volume (despawn, и т.п.) = overlap потерян.
pub fn tick_dwell_timers(
    mut zones: Query<(Entity, &mut TransitionState), With<ScopeZone>>,
    volumes: Query<(&GlobalTransform, &BoundingVolume)>,
    time: Res<Time>,
    mut outcomes: EventWriter<ScopeTransitionEvent>,
    mut elapsed: EventWriter<DwellElapsed>,
) {
    let now = time.elapsed();

    for (zone_entity, mut state) in zones.iter_mut() {
        let Some(timer) = state.dwell_timer().copied() else {
            continue;
        };

        let overlapping = match (volumes.get(zone_entity), volumes.get(timer.observer())) {
            (Ok(zone), Ok(observer)) => volumes_overlap(zone, observer),
            _ => false,
        };

        match timer.poll(now, overlapping) {
            DwellPoll::Waiting => {}
            DwellPoll::OverlapLost => {
                state.abort();
                outcomes.write(ScopeTransitionEvent::Canceled {
                    zone: zone_entity,
                    reason: CancelReason::OverlapLost,
                });
            }
            DwellPoll::Elapsed => {
                elapsed.write(DwellElapsed { zone: zone_entity });
            }
        }
    }
}

/// Система: View-Lock Committer
///
/// Lookup failure ловится целиком: CommitFailed (ровно один раз), зона → Idle,
/// locked остаётся false. Retry нет.
pub fn commit_view_locks(
    mut elapsed: EventReader<DwellElapsed>,
    mut zones: Query<(&ScopeZone, &mut TransitionState)>,
    mut scene: BevyScopeScene,
    layers: Res<LayerRegistry>,
    config: Res<ScopeTransitionConfig>,
    mut outcomes: EventWriter<ScopeTransitionEvent>,
) {
    for event in elapsed.read() {
        let Ok((zone, mut state)) = zones.get_mut(event.zone) else {
            continue;
        };

        // Успели отменить между tick'ом и commit'ом
        if !state.is_transitioning() {
            continue;
        }

        logger::log_info("Snapping to scope view.");

        match commit_view_lock(&mut scene, &layers, &config, zone.observer) {
            Ok(_) => {
                state.finish_commit(true);
                outcomes.write(ScopeTransitionEvent::Locked { zone: event.zone });
            }
            Err(error) => {
                state.finish_commit(false);
                outcomes.write(ScopeTransitionEvent::CommitFailed {
                    zone: event.zone,
                    error,
                });
            }
        }
    }
}

/// Система: ScopeTransitionEvent → logger (advisory, не correctness signal)
pub fn log_transition_events(mut outcomes: EventReader<ScopeTransitionEvent>) {
    for outcome in outcomes.read() {
        match outcome {
            ScopeTransitionEvent::Started { zone, observer } => {
                logger::log(&format!(
                    "Scope transition started: zone {:?}, observer {:?}",
                    zone, observer
                ));
            }
            ScopeTransitionEvent::Canceled { zone, reason } => {
                logger::log_info(&format!("Transition canceled. zone {:?} ({:?})", zone, reason));
            }
            ScopeTransitionEvent::Locked { zone } => {
                logger::log_info(&format!("View locked to scope: zone {:?}", zone));
            }
            ScopeTransitionEvent::CommitFailed { zone, error } => {
                logger::log_warning(&format!(
                    "Locked scope perspective target or scope camera was not found: zone {:?}: {}",
                    zone, error
                ));
            }
        }
    }
}
