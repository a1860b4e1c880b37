//! One run of the stealing game over an index-based arena.
//!
//! State is rebuilt from scratch per run and dropped after `RunResult` is
//! extracted. Participant `i` brings gift `i`.

use std::collections::VecDeque;

use gx_core::{ExchangeRng, ParticipantPreference, SimulationParams};

use crate::AlgoError;

#[derive(Debug, Clone)]
struct Player {
    turns_owed: u32,
    happiness: f64,
    /// Best steal value seen on this player's latest turn.
    hypothetical: f64,
    steals_made: u32,
    times_stolen_from: u32,
    /// Gift most recently taken from this player; they may not take it straight back.
    last_stolen_gift: Option<usize>,
    gift: Option<usize>,
}

#[derive(Debug, Clone)]
struct Gift {
    novelty: f64,
    practicality: f64,
    opened: bool,
    steal_count: u32,
    holder: Option<usize>,
}

/// What one run leaves behind, indexed like the input.
#[derive(Debug, Clone, PartialEq)]
pub struct RunResult {
    pub happiness: Vec<f64>,
    /// Times each player was stolen from.
    pub stolen_from: Vec<u32>,
    /// Steals each player made.
    pub stole: Vec<u32>,
    pub steals: u32,
}

/// Happiness `pref` would get from a gift with these attributes.
///
/// Each dimension maps `baseline + happiness_per_point * (attr - preferred)`
/// into the happiness bounds; the two are averaged.
pub fn gift_happiness(
    pref: &ParticipantPreference,
    novelty: f64,
    practicality: f64,
    params: &SimulationParams,
) -> f64 {
    let dim = |attr: f64, wanted: f64| {
        params.clamp_happiness(params.baseline_happiness + params.happiness_per_point * (attr - wanted))
    };
    let n = dim(novelty, pref.novelty_receiving.as_f64());
    let p = dim(practicality, pref.practicality_receiving.as_f64());
    params.clamp_happiness((n + p) / 2.0)
}

pub(crate) struct Game<'a> {
    prefs: &'a [ParticipantPreference],
    params: &'a SimulationParams,
    players: Vec<Player>,
    gifts: Vec<Gift>,
    queue: VecDeque<usize>,
    steals: u32,
}

enum Move {
    Open,
    Steal { gift: usize },
}

impl<'a> Game<'a> {
    pub(crate) fn new(prefs: &'a [ParticipantPreference], params: &'a SimulationParams, order: &[usize]) -> Self {
        let players = prefs
            .iter()
            .map(|_| Player {
                turns_owed: 1,
                happiness: params.baseline_happiness,
                hypothetical: params.baseline_happiness,
                steals_made: 0,
                times_stolen_from: 0,
                last_stolen_gift: None,
                gift: None,
            })
            .collect();
        let gifts = prefs
            .iter()
            .map(|p| Gift {
                novelty: p.novelty_giving.as_f64(),
                practicality: p.practicality_giving.as_f64(),
                opened: false,
                steal_count: 0,
                holder: None,
            })
            .collect();
        Self {
            prefs,
            params,
            players,
            gifts,
            queue: order.iter().copied().collect(),
            steals: 0,
        }
    }

    /// Play until nobody owes a turn.
    pub(crate) fn play(mut self, rng: &mut ExchangeRng) -> Result<RunResult, AlgoError> {
        let n = self.players.len();
        let max_steps = n + n * self.params.max_steals_per_gift as usize;
        let mut steps = 0usize;

        while let Some(actor) = self.queue.pop_front() {
            steps += 1;
            if steps > max_steps {
                return Err(AlgoError::SimulationStalled { steps: max_steps });
            }
            self.players[actor].turns_owed = self.players[actor].turns_owed.saturating_sub(1);

            match self.decide(actor) {
                Move::Steal { gift } => self.steal(actor, gift)?,
                Move::Open => self.open(actor, rng, max_steps)?,
            }
            // every move leaves the actor holding a gift
            debug_assert_eq!(self.players[actor].turns_owed, 0);
        }

        self.settle();
        Ok(self.into_result())
    }

    fn decide(&mut self, actor: usize) -> Move {
        let pref = &self.prefs[actor];
        let bonus = self.params.steal_bonus_per_point * pref.enjoy_stealing.as_f64();
        let last = self.players[actor].last_stolen_gift;

        let mut best: Option<(usize, f64)> = None;
        for (gi, g) in self.gifts.iter().enumerate() {
            let eligible = g.opened
                && g.steal_count < self.params.max_steals_per_gift
                && g.holder.is_some_and(|h| h != actor)
                && last != Some(gi);
            if !eligible {
                continue;
            }
            let value = self
                .params
                .clamp_happiness(gift_happiness(pref, g.novelty, g.practicality, self.params) + bonus);
            if best.map_or(true, |(_, bv)| value > bv) {
                best = Some((gi, value));
            }
        }

        match best {
            Some((gift, value)) => {
                self.players[actor].hypothetical = value;
                if value >= self.params.baseline_happiness {
                    Move::Steal { gift }
                } else {
                    Move::Open
                }
            }
            None => Move::Open,
        }
    }

    fn open(&mut self, actor: usize, rng: &mut ExchangeRng, max_steps: usize) -> Result<(), AlgoError> {
        let unopened: Vec<usize> = (0..self.gifts.len()).filter(|&g| !self.gifts[g].opened).collect();
        let pick = rng
            .choose_index(unopened.len())
            .map(|i| unopened[i])
            .ok_or(AlgoError::SimulationStalled { steps: max_steps })?;

        let gift = &mut self.gifts[pick];
        gift.opened = true;
        gift.holder = Some(actor);
        let h = gift_happiness(&self.prefs[actor], gift.novelty, gift.practicality, self.params);

        let player = &mut self.players[actor];
        player.gift = Some(pick);
        player.happiness = h;
        Ok(())
    }

    fn steal(&mut self, actor: usize, gift_ix: usize) -> Result<(), AlgoError> {
        let gift = &mut self.gifts[gift_ix];
        let victim = gift.holder.ok_or(AlgoError::SimulationStalled { steps: 0 })?;
        gift.holder = Some(actor);
        gift.steal_count += 1;

        let a = &mut self.players[actor];
        a.gift = Some(gift_ix);
        a.happiness = a.hypothetical;
        a.steals_made += 1;

        let v = &mut self.players[victim];
        v.gift = None;
        v.happiness = self.params.baseline_happiness;
        v.times_stolen_from += 1;
        v.last_stolen_gift = Some(gift_ix);
        v.turns_owed += 1;

        // victim plays next
        self.queue.push_front(victim);
        self.steals += 1;
        Ok(())
    }

    fn settle(&mut self) {
        for (p, pref) in self.players.iter_mut().zip(self.prefs) {
            if p.times_stolen_from > 0 {
                let penalty = self.params.stolen_penalty_per_point * pref.hate_being_stolen_from.as_f64();
                p.happiness = self.params.clamp_happiness(p.happiness - penalty);
            }
        }
    }

    fn into_result(self) -> RunResult {
        RunResult {
            happiness: self.players.iter().map(|p| p.happiness).collect(),
            stolen_from: self.players.iter().map(|p| p.times_stolen_from).collect(),
            stole: self.players.iter().map(|p| p.steals_made).collect(),
            steals: self.steals,
        }
    }
}
