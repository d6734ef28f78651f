//! SLR(1) action/goto table construction.
//!
//! The tables are derived from [`PRODUCTIONS`] the first time a formula is
//! parsed and shared read-only for the rest of the process. States are
//! numbered in discovery order, so the start state is always 0.

use std::collections::{BTreeSet, HashMap};

use log::{debug, warn};
use once_cell::sync::Lazy;

use crate::grammar::{
    N_NONTERMINALS, N_SYMBOLS, N_TERMINALS, NonTerminal, PRODUCTIONS, Production, Symbol,
    Terminal,
};

/// An LR(0) item: a production with a marker inside its body.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub struct Item {
    pub prod: usize,
    pub dot: usize,
}

impl Item {
    fn next_symbol(&self, prods: &[Production]) -> Option<Symbol> {
        prods[self.prod].body.get(self.dot).copied()
    }
}

pub type ItemSet = BTreeSet<Item>;

/// One parser action for a (state, terminal) pair.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Action {
    Error,
    Shift(usize),
    Reduce(usize),
    Accept,
}

/// A cell that received more than one action while the table was built.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Conflict {
    pub state: usize,
    pub terminal: Terminal,
    pub kept: Action,
    pub dropped: Action,
}

/// Parse tables for a grammar.
#[derive(Debug)]
pub struct ParseTable {
    actions: Vec<[Action; N_TERMINALS]>,
    gotos: Vec<[Option<usize>; N_NONTERMINALS]>,
    conflicts: Vec<Conflict>,
}

/// Tables for the formula grammar.
pub static TABLE: Lazy<ParseTable> = Lazy::new(|| ParseTable::build(&PRODUCTIONS));

/// Adds, for each item whose dot stands before a nonterminal, the items of
/// that nonterminal's productions with the dot at the start, until nothing
/// changes.
pub fn closure(items: &ItemSet, prods: &[Production]) -> ItemSet {
    let mut c = items.clone();
    let mut pending: Vec<Item> = c.iter().copied().collect();
    while let Some(item) = pending.pop() {
        if let Some(Symbol::N(nt)) = item.next_symbol(prods) {
            for (j, p) in prods.iter().enumerate() {
                if p.lhs == nt {
                    let new_item = Item { prod: j, dot: 0 };
                    if c.insert(new_item) {
                        pending.push(new_item);
                    }
                }
            }
        }
    }
    c
}

/// Items of `items` advanced past `sym`, closed.
pub fn goto(items: &ItemSet, sym: Symbol, prods: &[Production]) -> ItemSet {
    let moved: ItemSet = items
        .iter()
        .filter(|item| item.next_symbol(prods) == Some(sym))
        .map(|item| Item {
            prod: item.prod,
            dot: item.dot + 1,
        })
        .collect();
    closure(&moved, prods)
}

fn all_symbols() -> impl Iterator<Item = Symbol> {
    NonTerminal::ALL
        .into_iter()
        .map(Symbol::N)
        .chain(Terminal::ALL.into_iter().map(Symbol::T))
}

/// FIRST sets and nullability for every symbol, indexed by [`Symbol::index`].
pub fn first_sets(prods: &[Production]) -> (Vec<BTreeSet<Terminal>>, Vec<bool>) {
    let mut first: Vec<BTreeSet<Terminal>> = vec![BTreeSet::new(); N_SYMBOLS];
    let mut nullable = vec![false; N_SYMBOLS];
    for t in Terminal::ALL {
        first[Symbol::T(t).index()].insert(t);
    }
    let mut changed = true;
    while changed {
        changed = false;
        for prod in prods {
            let lhs = Symbol::N(prod.lhs).index();
            let mut all_nullable = true;
            for sym in prod.body {
                let first_sym = first[sym.index()].clone();
                for f in first_sym {
                    changed |= first[lhs].insert(f);
                }
                if !nullable[sym.index()] {
                    all_nullable = false;
                    break;
                }
            }
            if all_nullable && !nullable[lhs] {
                nullable[lhs] = true;
                changed = true;
            }
        }
    }
    (first, nullable)
}

/// FOLLOW sets for every nonterminal, indexed by `NonTerminal as usize`.
pub fn follow_sets(
    prods: &[Production],
    first: &[BTreeSet<Terminal>],
    nullable: &[bool],
) -> Vec<BTreeSet<Terminal>> {
    let mut follow: Vec<BTreeSet<Terminal>> = vec![BTreeSet::new(); N_NONTERMINALS];
    follow[NonTerminal::Start as usize].insert(Terminal::End);
    let mut changed = true;
    while changed {
        changed = false;
        for prod in prods {
            let lhs = prod.lhs as usize;
            for (i, sym) in prod.body.iter().enumerate() {
                let Symbol::N(b) = *sym else { continue };
                let b = b as usize;
                let mut beta_nullable = true;
                let mut first_beta = BTreeSet::new();
                for rest in &prod.body[i + 1..] {
                    first_beta.extend(first[rest.index()].iter().copied());
                    if !nullable[rest.index()] {
                        beta_nullable = false;
                        break;
                    }
                }
                for f in first_beta {
                    changed |= follow[b].insert(f);
                }
                if beta_nullable {
                    let follow_lhs = follow[lhs].clone();
                    for f in follow_lhs {
                        changed |= follow[b].insert(f);
                    }
                }
            }
        }
    }
    follow
}

/// Builds the canonical LR(0) collection. Returns the states in discovery
/// order and the transitions between them.
pub fn canonical_collection(prods: &[Production]) -> (Vec<ItemSet>, Vec<HashMap<Symbol, usize>>) {
    let start = closure(&ItemSet::from([Item { prod: 0, dot: 0 }]), prods);
    let mut states = vec![start.clone()];
    let mut index: HashMap<ItemSet, usize> = HashMap::from([(start, 0)]);
    let mut transitions: Vec<HashMap<Symbol, usize>> = vec![HashMap::new()];
    let mut next = 0;
    while next < states.len() {
        let state = states[next].clone();
        for sym in all_symbols() {
            let target = goto(&state, sym, prods);
            if target.is_empty() {
                continue;
            }
            let id = match index.get(&target) {
                Some(&id) => id,
                None => {
                    let id = states.len();
                    index.insert(target.clone(), id);
                    states.push(target);
                    transitions.push(HashMap::new());
                    id
                }
            };
            transitions[next].insert(sym, id);
        }
        next += 1;
    }
    (states, transitions)
}

impl ParseTable {
    /// Builds the SLR(1) tables for `prods`, where production 0 is the
    /// augmented start production.
    ///
    /// Conflicting cells keep a shift over a reduce, and the lower-numbered
    /// production between two reduces. Every conflict is logged and kept in
    /// [`ParseTable::conflicts`].
    pub fn build(prods: &[Production]) -> Self {
        let (states, transitions) = canonical_collection(prods);
        let (first, nullable) = first_sets(prods);
        let follow = follow_sets(prods, &first, &nullable);

        let mut table = ParseTable {
            actions: vec![[Action::Error; N_TERMINALS]; states.len()],
            gotos: vec![[None; N_NONTERMINALS]; states.len()],
            conflicts: Vec::new(),
        };

        for (state, items) in states.iter().enumerate() {
            for (sym, &target) in &transitions[state] {
                match *sym {
                    Symbol::T(t) => table.set_action(state, t, Action::Shift(target)),
                    Symbol::N(n) => table.gotos[state][n as usize] = Some(target),
                }
            }
            for item in items {
                let prod = &prods[item.prod];
                if item.dot < prod.body.len() {
                    continue;
                }
                if item.prod == 0 {
                    table.set_action(state, Terminal::End, Action::Accept);
                    continue;
                }
                for &t in &follow[prod.lhs as usize] {
                    table.set_action(state, t, Action::Reduce(item.prod));
                }
            }
        }

        debug!(
            "built parse table: {} states, {} conflicts",
            states.len(),
            table.conflicts.len()
        );
        table
    }

    fn set_action(&mut self, state: usize, terminal: Terminal, action: Action) {
        let cell = &mut self.actions[state][terminal as usize];
        let (kept, dropped) = match (*cell, action) {
            (Action::Error, _) => {
                *cell = action;
                return;
            }
            (old, new) if old == new => return,
            (Action::Reduce(old), Action::Reduce(new)) if new < old => {
                (Action::Reduce(new), Action::Reduce(old))
            }
            (Action::Reduce(_), Action::Shift(_)) | (Action::Reduce(_), Action::Accept) => {
                (action, *cell)
            }
            (old, new) => (old, new),
        };
        warn!(
            "conflict in state {} on '{}': keeping {:?}, dropping {:?}",
            state, terminal, kept, dropped
        );
        *cell = kept;
        self.conflicts.push(Conflict {
            state,
            terminal,
            kept,
            dropped,
        });
    }

    pub fn start_state(&self) -> usize {
        0
    }

    pub fn state_count(&self) -> usize {
        self.actions.len()
    }

    pub fn action(&self, state: usize, terminal: Terminal) -> Action {
        self.actions
            .get(state)
            .map_or(Action::Error, |row| row[terminal as usize])
    }

    pub fn goto(&self, state: usize, nonterminal: NonTerminal) -> Option<usize> {
        self.gotos
            .get(state)
            .and_then(|row| row[nonterminal as usize])
    }

    /// Terminals with a non-error action in `state`.
    pub fn expected(&self, state: usize) -> Vec<Terminal> {
        Terminal::ALL
            .into_iter()
            .filter(|t| self.action(state, *t) != Action::Error)
            .collect()
    }

    pub fn conflicts(&self) -> &[Conflict] {
        &self.conflicts
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grammar::Reduction;

    #[test]
    fn test_formula_grammar_is_slr1() {
        assert!(
            TABLE.conflicts().is_empty(),
            "unexpected conflicts: {:?}",
            TABLE.conflicts()
        );
    }

    #[test]
    fn test_start_state_expectations() {
        let mut expected = TABLE.expected(TABLE.start_state());
        expected.sort();
        assert_eq!(
            expected,
            vec![
                Terminal::LeftRound,
                Terminal::Minus,
                Terminal::Plus,
                Terminal::Function,
                Terminal::IntConst,
                Terminal::FloatConst,
                Terminal::Variable,
                Terminal::Empty,
            ]
        );
    }

    #[test]
    fn test_dot_is_never_expected() {
        for state in 0..TABLE.state_count() {
            assert_eq!(TABLE.action(state, Terminal::Dot), Action::Error);
        }
    }

    #[test]
    fn test_follow_sets() {
        let (first, nullable) = first_sets(&PRODUCTIONS);
        assert!(nullable.iter().all(|n| !n));
        let follow = follow_sets(&PRODUCTIONS, &first, &nullable);
        let leftrange: Vec<_> = follow[NonTerminal::LeftRange as usize].iter().copied().collect();
        assert_eq!(leftrange, vec![Terminal::Comma]);
        let range: BTreeSet<_> = follow[NonTerminal::Range as usize].clone();
        assert_eq!(
            range,
            BTreeSet::from([Terminal::Semicolon, Terminal::VerticalBar, Terminal::End])
        );
        assert!(!follow[NonTerminal::Factor as usize].contains(&Terminal::Power));
    }

    #[test]
    fn test_conflicts_prefer_shift() {
        // E -> E + E | x is ambiguous; the shift on '+' must win.
        use crate::grammar::{NonTerminal as NT, Symbol::*, Terminal as Tm};
        static AMBIGUOUS: [Production; 3] = [
            Production {
                lhs: NT::Start,
                body: &[N(NT::Term)],
                reduction: Reduction::PassThrough(0),
            },
            Production {
                lhs: NT::Term,
                body: &[N(NT::Term), T(Tm::Plus), N(NT::Term)],
                reduction: Reduction::CenterOperation { operator: 1 },
            },
            Production {
                lhs: NT::Term,
                body: &[T(Tm::Variable)],
                reduction: Reduction::Name,
            },
        ];
        let table = ParseTable::build(&AMBIGUOUS);
        assert!(!table.conflicts().is_empty());
        for conflict in table.conflicts() {
            assert_eq!(conflict.terminal, Terminal::Plus);
            assert!(matches!(conflict.kept, Action::Shift(_)));
            assert_eq!(conflict.dropped, Action::Reduce(1));
        }
    }
}
