//! Répartition proportionnelle par la méthode des plus forts restes.

use crate::model::{Unit, UnitId};
use std::cmp::Ordering;
use std::collections::BTreeMap;

/// Part exacte d'une unité avant arrondi.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Quota {
    pub unit: UnitId,
    pub weight: f64,
    pub base: usize,
    pub remainder: f64,
}

/// Ordre de priorité pour les jours restants : reste décroissant, puis
/// pensum décroissant, puis identifiant décroissant (le plus grand gagne).
pub fn priority_order(a: &Quota, b: &Quota) -> Ordering {
    b.remainder
        .total_cmp(&a.remainder)
        .then_with(|| b.weight.total_cmp(&a.weight))
        .then_with(|| b.unit.cmp(&a.unit))
}

pub fn quotas(units: &[Unit], total_days: usize) -> Vec<Quota> {
    let total_weight: f64 = units.iter().map(|u| u.weight).sum();
    units
        .iter()
        .map(|u| {
            let exact = u.weight / total_weight * total_days as f64;
            let base = exact.floor();
            Quota {
                unit: u.id,
                weight: u.weight,
                base: base as usize,
                remainder: exact - base,
            }
        })
        .collect()
}

/// Cible entière de jours par unité ; la somme vaut `total_days` dès que le
/// pensum total est > 0, sinon toutes les cibles valent 0. Un identifiant
/// répété ne compte qu'une fois, avec le pensum de sa dernière définition.
pub fn compute_targets(units: &[Unit], total_days: usize) -> BTreeMap<UnitId, usize> {
    let weights: BTreeMap<UnitId, f64> = units.iter().map(|u| (u.id, u.weight)).collect();
    let units: Vec<Unit> = weights.into_iter().map(|(id, w)| Unit::new(id, w)).collect();
    let units = units.as_slice();

    let total_weight: f64 = units.iter().map(|u| u.weight).sum();
    if total_weight <= 0.0 || units.is_empty() {
        return units.iter().map(|u| (u.id, 0)).collect();
    }

    let mut quotas = quotas(units, total_days);
    quotas.sort_by(priority_order);

    let mut targets: BTreeMap<UnitId, usize> = BTreeMap::new();
    for q in &quotas {
        targets.insert(q.unit, q.base);
    }

    let assigned: usize = quotas.iter().map(|q| q.base).sum();
    let remaining = total_days.saturating_sub(assigned);
    for q in quotas.iter().cycle().take(remaining) {
        *targets.entry(q.unit).or_insert(0) += 1;
    }
    targets
}
