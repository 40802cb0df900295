//! MOSFET device parameters
//!
//! Terminal voltages, body-effect and process parameters, and the two
//! parameters that can be given in either raw or pre-combined form
//! (output impedance and velocity saturation).

use serde::{Deserialize, Serialize};

use super::types::{ActivationMode, ModelSelector};

/// Absolute terminal voltages [V]
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Terminals {
    pub vg: f64,
    pub vs: f64,
    pub vd: f64,
    pub vb: f64,
}

impl Terminals {
    pub fn new(vg: f64, vs: f64, vd: f64, vb: f64) -> Self {
        Self { vg, vs, vd, vb }
    }

    /// Polarity-correct differentials fed to the threshold corrector and kernels.
    ///
    /// NMOS: `vxb = Vs - Vb`, `vgs = Vg - Vs`, `vds = Vd - Vs`.
    /// PMOS: `vxb = Vb - Vs`, `vgs = Vs - Vg` (Vsg), `vds = Vd - Vs`.
    ///
    /// The PMOS drain differential keeps the `Vd - Vs` orientation rather than
    /// `Vs - Vd`, matching the established behavior of this model: a drain
    /// below the source gives a negative Vsd and lands in triode.
    pub fn differentials(&self, mode: ActivationMode) -> Differentials {
        match mode {
            ActivationMode::Nmos => Differentials {
                vxb: self.vs - self.vb,
                vgs: self.vg - self.vs,
                vds: self.vd - self.vs,
            },
            ActivationMode::Pmos => Differentials {
                vxb: self.vb - self.vs,
                vgs: self.vs - self.vg,
                vds: self.vd - self.vs,
            },
        }
    }
}

/// Terminal differentials after polarity correction
///
/// For PMOS `vxb` holds Vbs and `vgs` holds Vsg.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Differentials {
    pub vxb: f64,
    pub vgs: f64,
    pub vds: f64,
}

/// Body-effect parameters
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BodyEffect {
    /// Body-effect coefficient [V^0.5]
    pub gamma: f64,
    /// Surface potential [V]
    pub phi: f64,
    /// Nominal (zero body bias) threshold voltage [V]
    pub vt: f64,
}

/// Process and geometry parameters
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Process {
    /// Gate oxide capacitance per unit area
    pub cox: f64,
    /// Carrier mobility (Un for NMOS, Up for PMOS)
    pub mobility: f64,
    /// Channel width
    pub w: f64,
    /// Channel length
    pub l: f64,
}

impl Process {
    /// Process transconductance k' = mobility * Cox
    pub fn kprime(&self) -> f64 {
        self.mobility * self.cox
    }

    /// Aspect ratio W / L
    pub fn aspect(&self) -> f64 {
        self.w / self.l
    }
}

/// Channel-length modulation, as an Early voltage or already inverted
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutputImpedance {
    /// Early voltage Va [V]; lambda = 1 / Va
    EarlyVoltage(f64),
    /// Lambda [1/V]
    Lambda(f64),
}

impl OutputImpedance {
    pub fn lambda(&self) -> f64 {
        match *self {
            OutputImpedance::EarlyVoltage(va) => 1.0 / va,
            OutputImpedance::Lambda(lambda) => lambda,
        }
    }
}

impl Default for OutputImpedance {
    fn default() -> Self {
        OutputImpedance::Lambda(0.0)
    }
}

/// Velocity-saturation parameter, split or pre-multiplied
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VelocitySaturation {
    /// Critical field Ec and carrier path length L
    Split { ec: f64, l: f64 },
    /// The product Ec * L
    Combined(f64),
}

impl VelocitySaturation {
    pub fn ec_l(&self) -> f64 {
        match *self {
            VelocitySaturation::Split { ec, l } => ec * l,
            VelocitySaturation::Combined(ec_l) => ec_l,
        }
    }
}

/// Everything the dispatcher needs besides terminal voltages
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeviceParams {
    pub mode: ActivationMode,
    pub model: ModelSelector,
    pub body: BodyEffect,
    pub process: Process,
    #[serde(default)]
    pub output: OutputImpedance,
    /// Required when `model` is the short-channel model
    #[serde(default)]
    pub velocity: Option<VelocitySaturation>,
}

impl Default for DeviceParams {
    fn default() -> Self {
        Self::nmos_default()
    }
}

impl DeviceParams {
    /// NMOS defaults: k' = 200, W/L = 3, EcLc = 0.6, no channel-length modulation
    pub fn nmos_default() -> Self {
        DeviceParams {
            mode: ActivationMode::Nmos,
            model: ModelSelector::ShortChannel,
            body: BodyEffect {
                gamma: 0.3,
                phi: 0.4,
                vt: 0.3,
            },
            process: Process {
                cox: 1.0,
                mobility: 200.0,
                w: 3.0,
                l: 1.0,
            },
            output: OutputImpedance::Lambda(0.0),
            velocity: Some(VelocitySaturation::Combined(0.6)),
        }
    }

    /// PMOS defaults: negative threshold, otherwise mirrors NMOS
    pub fn pmos_default() -> Self {
        let mut params = Self::nmos_default();
        params.mode = ActivationMode::Pmos;
        params.body.vt = -0.3;
        params
    }

    pub fn default_for(mode: ActivationMode) -> Self {
        match mode {
            ActivationMode::Nmos => Self::nmos_default(),
            ActivationMode::Pmos => Self::pmos_default(),
        }
    }
}
