//! Отложенные, неотменяемые таймеры акторов
//!
//! Каждый актор владеет своим `TimerQueue` (min-heap по `due_at`).
//! Очередь опрашивается в начале `update` актора: все созревшие записи
//! выдаются по порядку и обрабатываются до конца (atomic step).
//!
//! Отмены нет. Если актор умер пока таймер ждал, таймер всё равно
//! сработает, обработчик сам проверяет health/state перед мутацией.

use std::cmp::{Ordering, Reverse};
use std::collections::BinaryHeap;

/// Время симуляции в миллисекундах (monotonic, задаётся хостом)
pub type Millis = u64;

/// Запись таймера: когда сработать + что сделать
#[derive(Debug, Clone)]
pub struct ScheduledTimer<P> {
    pub due_at: Millis,
    /// Порядок вставки: равные due_at срабатывают FIFO
    seq: u64,
    pub payload: P,
}

impl<P> PartialEq for ScheduledTimer<P> {
    fn eq(&self, other: &Self) -> bool {
        self.due_at == other.due_at && self.seq == other.seq
    }
}

impl<P> Eq for ScheduledTimer<P> {}

impl<P> PartialOrd for ScheduledTimer<P> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<P> Ord for ScheduledTimer<P> {
    fn cmp(&self, other: &Self) -> Ordering {
        self.due_at
            .cmp(&other.due_at)
            .then_with(|| self.seq.cmp(&other.seq))
    }
}

#[derive(Debug, Clone)]
pub struct TimerQueue<P> {
    heap: BinaryHeap<Reverse<ScheduledTimer<P>>>,
    next_seq: u64,
}

impl<P> Default for TimerQueue<P> {
    fn default() -> Self {
        Self {
            heap: BinaryHeap::new(),
            next_seq: 0,
        }
    }
}

impl<P> TimerQueue<P> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Запланировать `payload` через `delay` мс от `now`
    pub fn schedule(&mut self, now: Millis, delay: Millis, payload: P) {
        let seq = self.next_seq;
        self.next_seq += 1;
        self.heap.push(Reverse(ScheduledTimer {
            due_at: now.saturating_add(delay),
            seq,
            payload,
        }));
    }

    /// Снять самый ранний созревший таймер (due_at <= now)
    pub fn pop_due(&mut self, now: Millis) -> Option<P> {
        let is_due = self
            .heap
            .peek()
            .map(|Reverse(timer)| timer.due_at <= now)
            .unwrap_or(false);

        if is_due {
            self.heap.pop().map(|Reverse(timer)| timer.payload)
        } else {
            None
        }
    }

    pub fn next_due_at(&self) -> Option<Millis> {
        self.heap.peek().map(|Reverse(timer)| timer.due_at)
    }

    pub fn len(&self) -> usize {
        self.heap.len()
    }

    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }
}
