//! Fuzzer for the `Sequence` API.
//!
//! Replays arbitrary operation lists against a `Sequence` and a plain `Vec`
//! model, checking contents, capacity policy and cleanup calls after each
//! step. Out of range positions are folded into range first, since those
//! are documented panics.

#![no_main]
use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use std::cell::RefCell;
use std::rc::Rc;
use vechash::{callbacks, Sequence, SequenceBuilder};

type Pos = u16;
type Val = u32;

#[derive(Clone, Debug, Arbitrary)]
enum Op {
    Append(Val),
    Insert(Pos, Val),
    Delete(Pos),
    Replace(Pos, Val),
    Search(Pos, Val),
    Sort,
    SearchSorted(Pos, Val),
    Bump(Val),
}

struct Sim {
    seq: Sequence<Val>,
    model: Vec<Val>,
    /// Values seen by the cleanup callback
    cleaned: Rc<RefCell<Vec<Val>>>,
    /// Values the model expects to have been cleaned
    expect_cleaned: Vec<Val>,
    sorted: bool,
}

impl Sim {
    fn new(hint: u8) -> Self {
        let cleaned = Rc::new(RefCell::new(Vec::new()));
        let sink = cleaned.clone();
        let seq = SequenceBuilder::new()
            .initial_capacity(hint.into())
            .cleanup(move |v: &mut Val| sink.borrow_mut().push(*v))
            .build()
            .unwrap();
        Self {
            seq,
            model: Vec::new(),
            cleaned,
            expect_cleaned: Vec::new(),
            sorted: true,
        }
    }

    fn pos(&self, p: Pos, inclusive: bool) -> Option<usize> {
        let n = self.model.len() + usize::from(inclusive);
        (n > 0).then(|| usize::from(p) % n)
    }

    fn apply(&mut self, op: Op) {
        let capacity = self.seq.capacity();
        match op {
            Op::Append(v) => {
                self.seq.append(v);
                self.model.push(v);
                self.sorted = false;
            }
            Op::Insert(p, v) => {
                let at = self.pos(p, true).unwrap();
                self.seq.insert(v, at);
                self.model.insert(at, v);
                self.sorted = false;
            }
            Op::Delete(p) => {
                if let Some(at) = self.pos(p, false) {
                    self.seq.delete(at);
                    self.expect_cleaned.push(self.model.remove(at));
                }
            }
            Op::Replace(p, v) => {
                if let Some(at) = self.pos(p, false) {
                    self.seq.replace(v, at);
                    self.expect_cleaned.push(self.model[at]);
                    self.model[at] = v;
                    self.sorted = false;
                }
            }
            Op::Search(p, v) => {
                if let Some(start) = self.pos(p, false) {
                    let found = self.seq.search(&v, callbacks::natural, start, false);
                    let expected = self.model[start..]
                        .iter()
                        .position(|x| *x == v)
                        .map(|i| i + start);
                    assert_eq!(found, expected);
                }
            }
            Op::Sort => {
                self.seq.sort(callbacks::natural);
                self.model.sort_unstable();
                self.sorted = true;
            }
            Op::SearchSorted(p, v) => {
                if let (true, Some(start)) = (self.sorted, self.pos(p, false)) {
                    match self.seq.search(&v, callbacks::natural, start, true) {
                        Some(i) => {
                            assert!(i >= start);
                            assert_eq!(self.model[i], v);
                        }
                        None => assert!(!self.model[start..].contains(&v)),
                    }
                }
            }
            Op::Bump(d) => {
                self.seq.map(|x, d: &mut Val| *x = x.wrapping_add(*d), &mut { d });
                for x in self.model.iter_mut() {
                    *x = x.wrapping_add(d);
                }
                self.sorted = false;
            }
        }

        assert_eq!(self.seq.as_slice(), self.model.as_slice());
        assert!(self.seq.capacity() >= self.seq.len());
        assert!(self.seq.capacity() == capacity || self.seq.capacity() == capacity * 2);
        assert_eq!(*self.cleaned.borrow(), self.expect_cleaned);
    }

    fn finish(self) {
        let Sim {
            seq,
            model,
            cleaned,
            mut expect_cleaned,
            ..
        } = self;
        seq.dispose();
        expect_cleaned.extend(model);
        assert_eq!(*cleaned.borrow(), expect_cleaned);
    }
}

fuzz_target!(|ex: (u8, Vec<Op>)| {
    let (hint, ops) = ex;
    let mut sim = Sim::new(hint);
    for op in ops {
        sim.apply(op);
    }
    sim.finish();
});
