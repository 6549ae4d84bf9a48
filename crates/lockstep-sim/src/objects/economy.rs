use lockstep_snapshot::{
    EventId, FromSession, ObjectId, ObjectType, ReadSession, Result, WriteSession,
};

use super::game_object;
use crate::map::Good;

/// Scorekeeper of the economy-mode objective: which goods count, how many
/// each player has, and the timer that ends the match.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EconomyHandler {
    pub id: ObjectId,
    pub end_gf: u32,
    pub goods: Vec<Good>,
    /// `amounts[player][i]` counts `goods[i]` for that player.
    pub amounts: Vec<Vec<u32>>,
    pub event: Option<EventId>,
}

game_object!(EconomyHandler, tag = ObjectType::EconomyModeHandler);

impl EconomyHandler {
    pub fn new(id: ObjectId, end_gf: u32, goods: Vec<Good>, players: usize) -> Self {
        let amounts = vec![vec![0; goods.len()]; players];
        Self {
            id,
            end_gf,
            goods,
            amounts,
            event: None,
        }
    }

    /// Index of the leading player, ties going to the lower index.
    pub fn leader(&self) -> Option<usize> {
        self.amounts
            .iter()
            .map(|counts| counts.iter().map(|&c| u64::from(c)).sum::<u64>())
            .enumerate()
            .fold(None, |best: Option<(usize, u64)>, (player, total)| match best {
                Some((_, top)) if top >= total => best,
                _ => Some((player, total)),
            })
            .map(|(player, _)| player)
    }

    fn write(&self, session: &mut WriteSession<'_>) -> Result<()> {
        session.push_u32(self.end_gf);
        session.push_container_size(self.goods.len());
        for &good in &self.goods {
            session.push_enum8(good);
        }
        session.push_container_size(self.amounts.len());
        for counts in &self.amounts {
            debug_assert_eq!(counts.len(), self.goods.len());
            for &count in counts {
                session.push_u32(count);
            }
        }
        session.put_event_ref(self.event)
    }
}

impl FromSession for EconomyHandler {
    fn from_session(session: &mut ReadSession<'_>, id: ObjectId, _: ObjectType) -> Result<Self> {
        let end_gf = session.pop_u32()?;
        let len = session.pop_container_size()?;
        let goods = (0..len)
            .map(|_| session.pop_enum8::<Good>())
            .collect::<Result<Vec<_>>>()?;
        let players = session.pop_container_size()?;
        let amounts = (0..players)
            .map(|_| {
                (0..goods.len())
                    .map(|_| session.pop_u32())
                    .collect::<Result<Vec<_>>>()
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(Self {
            id,
            end_gf,
            goods,
            amounts,
            event: session.get_event()?,
        })
    }
}
