use io_trait::Io;
use std::{
    hint::black_box,
    io::{self, Error},
    thread,
    time::Instant,
};

use crate::{
    cast::{cast_ptr, oracle_cast, FastCast, Polymorphic},
    fixture::{
        complex::{ComplexBase, ComplexF, ComplexG},
        simple::{SimpleA, SimpleB, SimpleBase},
    },
};

/// Usage: `fastcast <iterations> <threads> <report>`.
pub fn run(io: &impl Io) -> io::Result<()> {
    let mut a = io.args();
    a.next();
    let iterations = parse_arg(a.next(), "iterations")?;
    let threads = parse_arg(a.next(), "threads")?;
    let output = a
        .next()
        .ok_or_else(|| Error::other("missing report path"))?;
    let report = report(iterations, threads);
    io.write(&output, report.as_bytes())
}

fn parse_arg(arg: Option<String>, name: &str) -> io::Result<usize> {
    let arg = arg.ok_or_else(|| Error::other(format!("missing {name}")))?;
    match arg.parse() {
        Ok(0) | Err(_) => Err(Error::other(format!("invalid {name}: {arg}"))),
        Ok(n) => Ok(n),
    }
}

/// Oracle and cached timings, in nanoseconds.
#[derive(Debug, Clone, Copy)]
struct Timing {
    oracle: u128,
    fast: u128,
}

fn time(iterations: usize, f: impl Fn()) -> u128 {
    let start = Instant::now();
    for _ in 0..iterations {
        f();
    }
    start.elapsed().as_nanos()
}

fn compare<S: ?Sized + Polymorphic, T: 'static>(s: &S, iterations: usize) -> Timing {
    Timing {
        oracle: time(iterations, || {
            black_box(oracle_cast::<T, S>(black_box(s)));
        }),
        fast: time(iterations, || {
            black_box(black_box(s).cast::<T>());
        }),
    }
}

fn scenarios(iterations: usize, threads: usize) -> Vec<(&'static str, Timing)> {
    let b = SimpleB::default();
    let simple: &dyn SimpleBase = &b;
    let a = SimpleA::default();
    let not_b: &dyn SimpleBase = &a;
    let g = ComplexG::default();
    let complex: &dyn ComplexBase = &g;
    vec![
        ("simple_ref", compare::<_, SimpleB>(simple, iterations)),
        ("complex_ref", compare::<_, ComplexG>(complex, iterations)),
        (
            "ptr_success",
            Timing {
                oracle: time(iterations, || {
                    black_box(oracle_cast::<SimpleB, _>(black_box(simple)));
                }),
                fast: time(iterations, || {
                    let p: *const dyn SimpleBase = black_box(simple);
                    black_box(unsafe { cast_ptr::<SimpleB, _>(p) });
                }),
            },
        ),
        ("ptr_failure", compare::<_, SimpleB>(not_b, iterations)),
        ("cross_cast", compare::<_, ComplexF>(complex, iterations)),
        ("reused_threads", reused(iterations, threads)),
    ]
}

/// The same cast on `threads` threads at once, wall time.
fn reused(iterations: usize, threads: usize) -> Timing {
    let wall = |f: fn(&dyn ComplexBase, usize) -> u128| {
        let start = Instant::now();
        thread::scope(|s| {
            for _ in 0..threads {
                s.spawn(move || {
                    let g = ComplexG::default();
                    f(&g, iterations)
                });
            }
        });
        start.elapsed().as_nanos()
    };
    Timing {
        oracle: wall(|c, n| compare::<_, ComplexG>(c, n).oracle),
        fast: wall(|c, n| compare::<_, ComplexG>(c, n).fast),
    }
}

fn report(iterations: usize, threads: usize) -> String {
    let mut result = String::new();
    for (name, timing) in scenarios(iterations, threads) {
        tracing::debug!(scenario = name, ?timing, "measured");
        result += &format!("{name} oracle={} fast={}\n", timing.oracle, timing.fast);
    }
    result
}
