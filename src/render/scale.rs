const E10: f64 = 7.0710678118654755; // sqrt(50)
const E5: f64 = 3.1622776601683795; // sqrt(10)
const E2: f64 = std::f64::consts::SQRT_2;

/// Continuous linear map from `domain` to `range`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LinearScale {
    domain: [f64; 2],
    range: [f64; 2],
}

impl LinearScale {
    pub fn new(domain: [f64; 2], range: [f64; 2]) -> Self {
        Self { domain, range }
    }

    pub fn domain(&self) -> [f64; 2] {
        self.domain
    }

    /// Map a domain value. A degenerate domain maps everything to the middle of the range.
    pub fn apply(&self, v: f64) -> f64 {
        let [d0, d1] = self.domain;
        let [r0, r1] = self.range;
        let span = d1 - d0;
        let t = if span == 0.0 { 0.5 } else { (v - d0) / span };
        r0 + (r1 - r0) * t
    }

    /// Roughly `count` human-friendly tick values covering the domain.
    pub fn ticks(&self, count: f64) -> Vec<f64> {
        ticks(self.domain[0], self.domain[1], count)
    }

    /// Distance between consecutive [`Self::ticks`].
    pub fn tick_step(&self, count: f64) -> f64 {
        let inc = tick_increment(self.domain[0], self.domain[1], count);
        if inc < 0.0 { -1.0 / inc } else { inc }
    }
}

struct TickSpec {
    i1: f64,
    i2: f64,
    inc: f64,
}

fn tick_spec(start: f64, stop: f64, count: f64) -> TickSpec {
    let step = (stop - start) / count.max(0.0);
    let power = step.log10().floor();
    let error = step / 10f64.powf(power);
    let factor = if error >= E10 {
        10.0
    } else if error >= E5 {
        5.0
    } else if error >= E2 {
        2.0
    } else {
        1.0
    };

    let (mut i1, mut i2, inc);
    if power < 0.0 {
        let pos = 10f64.powf(-power) / factor;
        i1 = (start * pos).round();
        i2 = (stop * pos).round();
        if i1 / pos < start {
            i1 += 1.0;
        }
        if i2 / pos > stop {
            i2 -= 1.0;
        }
        inc = -pos;
    } else {
        inc = 10f64.powf(power) * factor;
        i1 = (start / inc).round();
        i2 = (stop / inc).round();
        if i1 * inc < start {
            i1 += 1.0;
        }
        if i2 * inc > stop {
            i2 -= 1.0;
        }
    }

    if i2 < i1 && (0.5..2.0).contains(&count) {
        return tick_spec(start, stop, count * 2.0);
    }
    TickSpec { i1, i2, inc }
}

/// Signed tick increment: positive is a step, negative is the reciprocal of a sub-unit step.
pub fn tick_increment(start: f64, stop: f64, count: f64) -> f64 {
    tick_spec(start, stop, count).inc
}

/// Tick values for an ascending interval, following d3's `ticks`.
pub fn ticks(start: f64, stop: f64, count: f64) -> Vec<f64> {
    if !(count > 0.0) || !start.is_finite() || !stop.is_finite() {
        return Vec::new();
    }
    if start == stop {
        return vec![start];
    }
    let (lo, hi) = if stop < start { (stop, start) } else { (start, stop) };
    let TickSpec { i1, i2, inc } = tick_spec(lo, hi, count);
    if !(i2 >= i1) {
        return Vec::new();
    }

    let n = (i2 - i1) as usize + 1;
    let mut out: Vec<f64> = (0..n)
        .map(|i| {
            let k = i1 + i as f64;
            if inc < 0.0 { k / -inc } else { k * inc }
        })
        .collect();
    if stop < start {
        out.reverse();
    }
    out
}

/// Ordinal band positions for `len` slots, following d3's `scaleBand` with `rangeRound`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BandScale {
    start: f64,
    step: f64,
    bandwidth: f64,
    len: usize,
}

impl BandScale {
    /// `padding` sets both inner and outer padding; bands are centred (`align = 0.5`).
    pub fn new(len: usize, range: [f64; 2], padding: f64, round: bool) -> Self {
        let [r0, r1] = range;
        let n = len as f64;
        let mut step = (r1 - r0) / (n - padding + padding * 2.0).max(1.0);
        if round {
            step = step.floor();
        }
        let mut start = r0 + (r1 - r0 - step * (n - padding)) * 0.5;
        let mut bandwidth = step * (1.0 - padding);
        if round {
            start = start.round();
            bandwidth = bandwidth.round();
        }
        Self {
            start,
            step,
            bandwidth,
            len,
        }
    }

    /// Top of band `i`; indices past the end use the last band.
    pub fn position(&self, i: usize) -> f64 {
        let i = i.min(self.len.saturating_sub(1));
        self.start + self.step * i as f64
    }

    pub fn bandwidth(&self) -> f64 {
        self.bandwidth
    }

    pub fn step(&self) -> f64 {
        self.step
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/scale.rs"]
mod tests;
