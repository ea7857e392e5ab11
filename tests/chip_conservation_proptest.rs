//! Свойства движка на случайных раздачах (proptest).
//!
//! Игроки выбирают случайное действие из `valid_actions`. Проверяем:
//! - любое предложенное действие принимается движком;
//! - на каждом шаге банк равен сумме вкладов, фишки не появляются и не исчезают;
//! - раздача всегда завершается, а стеки стола после расчёта сохраняют сумму.

use proptest::prelude::*;

use agent_holdem::domain::chips::Chips;
use agent_holdem::domain::deck::Deck;
use agent_holdem::domain::hand::Hand;
use agent_holdem::domain::table::{SeatOccupant, Table, TableConfig};
use agent_holdem::engine::{
    apply_action, start_hand_with_deck, valid_actions, ActionKind, ActionLog, PlayerAction,
};
use agent_holdem::infra::DeterministicRng;
use agent_holdem::time_ctrl::TimeRules;

const MAX_STEPS: usize = 400;
const HANDS: u64 = 4;

fn table_with(stacks: &[u64]) -> Table {
    let mut table = Table::new(1, "prop".into(), TableConfig::new(9, 5, 10, 1, 10_000), 0);
    for (i, &stack) in stacks.iter().enumerate() {
        table.seats[i] = Some(SeatOccupant::new(i as u64 + 1, Chips(stack)));
    }
    table
}

fn hand_chips(hand: &Hand) -> Chips {
    let stacks: Chips = hand.players.iter().map(|p| p.stack).sum();
    stacks + hand.pot
}

/// Доиграть раздачу, беря решения из `choices` по кругу.
fn play_out(table: &mut Table, hand: &mut Hand, choices: &[u32]) -> Result<(), TestCaseError> {
    let rules = TimeRules::standard();
    let starting: Chips = hand.players.iter().map(|p| p.starting_stack).sum();

    for step in 0..MAX_STEPS {
        if hand.is_complete() {
            return Ok(());
        }
        let idx = hand.turn.index();
        prop_assert!(idx.is_some(), "незавершённая раздача без ходящего");
        let idx = idx.unwrap_or_default();

        let options = valid_actions(hand, idx);
        prop_assert!(!options.is_empty());
        let pick = choices[step % choices.len()];
        let option = &options[pick as usize % options.len()];
        let amount = match option.kind {
            ActionKind::Bet | ActionKind::Raise => {
                let lo = option.min_amount.unwrap_or_default().0;
                let hi = option.max_amount.unwrap_or_default().0.max(lo);
                Some(Chips(lo + u64::from(pick) % (hi - lo + 1)))
            }
            _ => None,
        };

        let action = PlayerAction::new(hand.players[idx].agent_id, option.kind, amount);
        let mut log = ActionLog::new();
        let res = apply_action(table, hand, &action, 1_000, &rules, &mut log);
        prop_assert!(res.is_ok(), "{:?} отклонено: {:?}", action, res);

        prop_assert_eq!(hand.pot, hand.total_contributed());
        prop_assert_eq!(hand_chips(hand), starting);
    }
    prop_assert!(hand.is_complete(), "раздача не завершилась за {} шагов", MAX_STEPS);
    Ok(())
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(128))]

    #[test]
    fn random_play_conserves_chips(
        stacks in prop::collection::vec(1u64..400, 2..=6),
        seed in any::<u64>(),
        choices in prop::collection::vec(any::<u32>(), 1..64),
    ) {
        let mut table = table_with(&stacks);
        let total = table.total_stacks();
        let mut rng = DeterministicRng::from_seed(seed);

        for hand_id in 1..=HANDS {
            if table.eligible_count() < 2 {
                break;
            }
            let deck = Deck::shuffled(&mut rng);
            let mut hand = start_hand_with_deck(&mut table, deck, hand_id, 1_000, &TimeRules::standard())
                .map_err(|e| TestCaseError::fail(e.to_string()))?;
            play_out(&mut table, &mut hand, &choices)?;

            let won: Chips = hand.winners.iter().map(|w| w.amount).sum();
            prop_assert_eq!(won, hand.pot);
            prop_assert_eq!(table.total_stacks(), total);
            prop_assert_eq!(table.current_hand_id, None);
        }
    }
}
