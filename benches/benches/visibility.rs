// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use criterion::{BatchSize, Criterion, Throughput, black_box, criterion_group, criterion_main};
use kurbo::Size;
use understory_visibility::{
    ClientRect, Controller, EventKinds, Host, ObservationTarget, PropMap, Props, Throttle,
    TrackOptions, VisibilityConfig, VisibilityMode, evaluate,
};

const VIEWPORT: Size = Size::new(1280.0, 720.0);

#[derive(Clone)]
struct Rng(u64);

impl Rng {
    fn new(seed: u64) -> Self {
        Self(seed)
    }
    fn next_u64(&mut self) -> u64 {
        let mut x = self.0;
        x ^= x << 13;
        x ^= x >> 7;
        x ^= x << 17;
        self.0 = x;
        x
    }
    fn next_f64(&mut self) -> f64 {
        let v = self.next_u64() >> 11;
        (v as f64) / ((1u64 << 53) as f64)
    }
}

/// Rects scattered over a page three viewports tall, scrolled to the middle.
fn gen_page_rects(count: usize) -> Vec<ClientRect> {
    let mut out = Vec::with_capacity(count);
    let mut rng = Rng::new(0xCAFE_F00D_DEAD_BEEF);
    for _ in 0..count {
        let w = 20.0 + rng.next_f64() * 300.0;
        let h = 20.0 + rng.next_f64() * 200.0;
        let left = rng.next_f64() * VIEWPORT.width - w / 2.0;
        let top = (rng.next_f64() * 3.0 - 1.0) * VIEWPORT.height;
        out.push(ClientRect::new(top, left, top + h, left + w, w, h));
    }
    out
}

fn bench_evaluate(c: &mut Criterion) {
    let mut group = c.benchmark_group("evaluate");
    let rects = gen_page_rects(4096);
    group.throughput(Throughput::Elements(rects.len() as u64));
    for (name, mode) in [("full", VisibilityMode::Full), ("partial", VisibilityMode::Partial)] {
        for offset in [0.0, 200.0] {
            group.bench_function(format!("{name}_offset{offset}"), |b| {
                b.iter(|| {
                    let visible = rects
                        .iter()
                        .filter(|r| evaluate(**r, VIEWPORT, offset, mode))
                        .count();
                    black_box(visible);
                });
            });
        }
    }
    group.finish();
}

fn bench_throttle(c: &mut Criterion) {
    let mut group = c.benchmark_group("throttle");
    // A scroll event every 4ms for ten seconds.
    let events: Vec<u64> = (0..2500).map(|i| i * 4).collect();
    group.throughput(Throughput::Elements(events.len() as u64));
    group.bench_function("scroll_stream_150ms", |b| {
        b.iter_batched(
            || Throttle::new(150),
            |mut t| {
                let mut runs = 0_usize;
                for &now in &events {
                    runs += usize::from(t.poll(now));
                    runs += usize::from(t.trigger(now));
                }
                black_box(runs);
            },
            BatchSize::SmallInput,
        );
    });
    group.finish();
}

/// A page whose only element moves with the scroll position.
struct Page {
    scroll_y: f64,
    rect: ClientRect,
}

impl Host for Page {
    type Node = ();
    type Container = ();

    fn viewport_size(&self) -> Option<Size> {
        Some(VIEWPORT)
    }
    fn measure(&self, _: &()) -> ClientRect {
        let mut r = self.rect;
        r.top -= self.scroll_y;
        r.bottom -= self.scroll_y;
        r
    }
    fn add_listener(&mut self, _: &ObservationTarget<()>, _: EventKinds) {}
    fn remove_listener(&mut self, _: &ObservationTarget<()>, _: EventKinds) {}
    fn create_wrapper(&mut self, _: &PropMap) {}
}

fn bench_controller(c: &mut Criterion) {
    let mut group = c.benchmark_group("controller");
    let events: Vec<u64> = (0..2500).map(|i| i * 4).collect();
    group.throughput(Throughput::Elements(events.len() as u64));
    for interval in [0_u64, 150] {
        group.bench_function(format!("scroll_sweep_interval{interval}"), |b| {
            b.iter_batched(
                || {
                    let mut page = Page {
                        scroll_y: 0.0,
                        rect: ClientRect::new(2000.0, 100.0, 2200.0, 400.0, 300.0, 200.0),
                    };
                    let config = VisibilityConfig::default().with_throttle_interval(interval);
                    let mut ctl = Controller::new(Props::new(TrackOptions::new(config), ()));
                    ctl.mount(&mut page, &PropMap::new(), 0);
                    let _ = ctl.tick(&mut page, 0);
                    (page, ctl)
                },
                |(mut page, mut ctl)| {
                    let mut renders = 0_usize;
                    for &now in &events {
                        page.scroll_y = now as f64;
                        renders += usize::from(ctl.tick(&mut page, now).is_render());
                        let refresh = ctl.handle_event(&mut page, EventKinds::SCROLL, now);
                        renders += usize::from(refresh.is_render());
                    }
                    ctl.unmount(&mut page);
                    black_box(renders);
                },
                BatchSize::SmallInput,
            );
        });
    }
    group.finish();
}

criterion_group!(benches, bench_evaluate, bench_throttle, bench_controller);
criterion_main!(benches);
