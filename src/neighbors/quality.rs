use clap::ValueEnum;

///////////////////////////////
/// How per-position quality scores in the input are encoded
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum QualityScale {
    #[default]
    Solexa,
    Phred,
}

impl QualityScale {
    pub fn to_phred(self, quality: f64) -> f64 {
        match self {
            QualityScale::Solexa => solexa_to_phred(quality),
            QualityScale::Phred => quality,
        }
    }

    ///////////////////////////////
    /// Probability that the base is read as one particular other base
    pub fn substitution_prob(self, quality: f64) -> f64 {
        phred_to_substitution_prob(self.to_phred(quality))
    }
}

pub fn solexa_to_phred(quality: f64) -> f64 {
    10.0 * (1.0 + 10f64.powf(quality / 10.0)).log10()
}

///////////////////////////////
/// Error probability of a Phred score, spread evenly over the three wrong bases
pub fn phred_to_substitution_prob(phred: f64) -> f64 {
    10f64.powf(-phred / 10.0) / 3.0
}
