use std::collections::HashMap;

use crate::domain::chips::Chips;
use crate::domain::hand::SidePot;
use crate::domain::{AgentId, SeatIndex};
use crate::engine::errors::EngineError;
use crate::eval::HandValue;

/// Итоговый вклад игрока в банк за раздачу.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Contribution {
    pub agent_id: AgentId,
    pub seat: SeatIndex,
    pub total_bet: Chips,
    pub folded: bool,
}

/// Посчитать банки из сумм, которые внесли игроки.
///
/// Уровни – различные ненулевые вклады по возрастанию. Размер уровня:
/// `(уровень − предыдущий) × число внёсших не меньше уровня`, считая сфолдивших.
/// Претенденты – не сфолдившие из той же группы.
///
/// Уровень без претендентов вливается в предыдущий банк (или в следующий,
/// если предыдущего ещё нет), так что фишки не теряются.
/// Переполнение при подсчёте уровня – ошибка целостности.
pub fn compute_side_pots(contributions: &[Contribution]) -> Result<Vec<SidePot>, EngineError> {
    let mut levels: Vec<Chips> = contributions
        .iter()
        .map(|c| c.total_bet)
        .filter(|c| !c.is_zero())
        .collect();
    levels.sort();
    levels.dedup();

    let mut pots: Vec<SidePot> = Vec::new();
    let mut carry = Chips::ZERO;
    let mut prev_level = Chips::ZERO;

    for level in levels {
        let group: Vec<&Contribution> = contributions
            .iter()
            .filter(|c| c.total_bet >= level)
            .collect();
        let amount = (level - prev_level)
            .checked_mul(group.len() as u64)
            .ok_or_else(|| EngineError::Integrity(format!("переполнение банка на уровне {level}")))?;
        let eligible: Vec<AgentId> = group
            .iter()
            .filter(|c| !c.folded)
            .map(|c| c.agent_id)
            .collect();

        if eligible.is_empty() {
            match pots.last_mut() {
                Some(lower) => lower.amount += amount,
                None => carry += amount,
            }
        } else {
            pots.push(SidePot {
                amount: amount + carry,
                eligible,
            });
            carry = Chips::ZERO;
        }
        prev_level = level;
    }

    if !carry.is_zero() {
        pots.push(SidePot {
            amount: carry,
            eligible: Vec::new(),
        });
    }

    Ok(pots)
}

/// Раздать банки по силе рук.
///
/// `clockwise_order` – агенты по часовой стрелке, начиная слева от кнопки.
/// Ничья делит банк поровну; остаток по одной фишке уходит победителям
/// в порядке `clockwise_order`.
pub fn award_pots(
    pots: &[SidePot],
    values: &HashMap<AgentId, HandValue>,
    clockwise_order: &[AgentId],
) -> Result<Vec<(AgentId, Chips)>, EngineError> {
    let mut awards: Vec<(AgentId, Chips)> = Vec::new();

    for pot in pots {
        let best = pot
            .eligible
            .iter()
            .filter_map(|id| values.get(id))
            .max()
            .ok_or_else(|| {
                EngineError::Integrity(format!("у банка {} нет претендентов", pot.amount))
            })?;

        let winners: Vec<AgentId> = clockwise_order
            .iter()
            .copied()
            .filter(|id| pot.eligible.contains(id) && values.get(id) == Some(best))
            .collect();
        if winners.is_empty() {
            return Err(EngineError::Integrity(
                "победитель банка не найден среди участников".into(),
            ));
        }

        let (share, remainder) = pot.amount.split(winners.len() as u64);
        for (i, agent_id) in winners.iter().enumerate() {
            let extra = if (i as u64) < remainder.0 { Chips(1) } else { Chips::ZERO };
            let amount = share + extra;
            match awards.iter_mut().find(|(id, _)| id == agent_id) {
                Some((_, total)) => *total += amount,
                None => awards.push((*agent_id, amount)),
            }
        }
    }

    Ok(awards)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn c(agent_id: AgentId, total: u64, folded: bool) -> Contribution {
        Contribution {
            agent_id,
            seat: agent_id as SeatIndex,
            total_bet: Chips(total),
            folded,
        }
    }

    #[test]
    fn folded_top_tier_flows_into_lower_pot() {
        // Игрок 3 поставил больше всех и сфолдил.
        let pots = compute_side_pots(&[c(1, 50, false), c(2, 100, false), c(3, 300, true)]).unwrap();
        let total: Chips = pots.iter().map(|p| p.amount).sum();
        assert_eq!(total, Chips(450));
        assert_eq!(pots.len(), 2);
        assert_eq!(pots[0].amount, Chips(150));
        assert_eq!(pots[1].amount, Chips(300));
        assert_eq!(pots[1].eligible, vec![2]);
    }

    #[test]
    fn zero_contributions_are_ignored() {
        let pots = compute_side_pots(&[c(1, 0, true), c(2, 20, false), c(3, 20, false)]).unwrap();
        assert_eq!(pots.len(), 1);
        assert_eq!(pots[0].amount, Chips(40));
    }
}
