use bon::Builder;

/// Process-wide constants of a simulation run.
#[must_use]
#[derive(Clone, Copy, Debug, Builder)]
pub struct Parameters {
    #[builder(default = 10)]
    pub n_devices: usize,

    #[builder(default = 24)]
    pub n_time_slots: usize,

    /// Length of one time slot in the unit the rates are expressed in.
    #[builder(default = 0.25)]
    pub slot_duration: f64,

    #[builder(default = 5)]
    pub n_charge_levels: usize,

    #[builder(default = 5)]
    pub n_discharge_levels: usize,

    /// Outer iterations of the per-device search.
    #[builder(default = 20)]
    pub n_search_iterations: usize,

    /// Candidates sampled per outer iteration of the per-device search.
    #[builder(default = 30)]
    pub population_size: usize,

    /// Give up after this many propose passes.
    ///
    /// [`None`] lets the game run until it converges.
    pub max_rounds: Option<usize>,
}

impl Default for Parameters {
    fn default() -> Self {
        Self::builder().build()
    }
}
