//! Fixed-binning histograms

use crate::numeric::Float;

use serde::{Deserialize, Serialize};

/// Binning and display metadata of a histogram
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct HistogramSpec {
    /// Name of the histogram in the output file
    pub name: &'static str,

    /// Title of the X axis
    pub x_title: &'static str,

    /// Title of the Y axis
    pub y_title: &'static str,

    /// Number of bins
    pub num_bins: usize,

    /// Lower edge of the first bin (inclusive)
    pub low: Float,

    /// Upper edge of the last bin (exclusive)
    pub high: Float,
}

/// Equal-width bins over [low, high), each holding an entry count
///
/// Values outside of the bin range are not entries of the histogram, but are
/// tallied as underflow and overflow for diagnostic purposes.
///
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Histogram {
    name: String,
    x_title: String,
    y_title: String,
    low: Float,
    high: Float,
    bins: Vec<u64>,
    underflow: u64,
    overflow: u64,
}
//
impl Histogram {
    /// Set up an empty histogram
    pub fn new(spec: &HistogramSpec) -> Self {
        assert!(spec.num_bins > 0, "A histogram needs at least one bin");
        assert!(spec.low < spec.high, "Histogram range must not be empty");
        Self {
            name: spec.name.to_owned(),
            x_title: spec.x_title.to_owned(),
            y_title: spec.y_title.to_owned(),
            low: spec.low,
            high: spec.high,
            bins: vec![0; spec.num_bins],
            underflow: 0,
            overflow: 0,
        }
    }

    /// Record one observation
    pub fn fill(&mut self, value: Float) {
        match self.find_bin(value) {
            Some(bin) => self.bins[bin] += 1,
            None if value < self.low => self.underflow += 1,
            // NaN lands here, as it does in the usual analysis libraries
            None => self.overflow += 1,
        }
    }

    /// Index of the bin which contains a value, if any
    pub fn find_bin(&self, value: Float) -> Option<usize> {
        if !(self.low..self.high).contains(&value) {
            return None;
        }
        let bin = ((value - self.low) / self.bin_width()) as usize;
        // Round-off may push values just below the upper edge out of range
        Some(bin.min(self.bins.len() - 1))
    }

    /// Integrate the contents of another histogram with the same binning
    pub fn merge(&mut self, other: &Self) {
        assert!(
            self.low == other.low && self.high == other.high && self.bins.len() == other.bins.len(),
            "Cannot merge histograms with different binnings"
        );
        for (dst, src) in self.bins.iter_mut().zip(&other.bins) {
            *dst += src;
        }
        self.underflow += other.underflow;
        self.overflow += other.overflow;
    }

    /// Name of the histogram
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Title of the X axis
    pub fn x_title(&self) -> &str {
        &self.x_title
    }

    /// Title of the Y axis
    pub fn y_title(&self) -> &str {
        &self.y_title
    }

    /// Lower edge of the bin range
    pub fn low(&self) -> Float {
        self.low
    }

    /// Upper edge of the bin range
    pub fn high(&self) -> Float {
        self.high
    }

    /// Width of each bin
    pub fn bin_width(&self) -> Float {
        (self.high - self.low) / self.bins.len() as Float
    }

    /// Center of a bin
    pub fn bin_center(&self, bin: usize) -> Float {
        self.low + (bin as Float + 0.5) * self.bin_width()
    }

    /// Entry counts of the bins
    pub fn bins(&self) -> &[u64] {
        &self.bins[..]
    }

    /// Number of observations within the bin range
    pub fn entries(&self) -> u64 {
        self.bins.iter().sum()
    }

    /// Number of observations below the bin range
    pub fn underflow(&self) -> u64 {
        self.underflow
    }

    /// Number of observations above the bin range (or NaN)
    pub fn overflow(&self) -> u64 {
        self.overflow
    }

    /// Mean of the in-range observations, estimated from bin centers
    pub fn mean(&self) -> Option<Float> {
        let entries = self.entries();
        (entries > 0).then(|| {
            let sum: Float = (self.bins.iter().enumerate())
                .map(|(bin, &count)| count as Float * self.bin_center(bin))
                .sum();
            sum / entries as Float
        })
    }
}
