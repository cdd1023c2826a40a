//! GFAS v1.2 parameter catalogs.
//!
//! Each archive names the same physical quantities differently: the Data Store
//! uses semantic variable names, MARS uses GRIB `param.table` codes (table 210).
//! Rows are kept in the order the archive documentation lists them.

use crate::archive::Archive;
use crate::error::{Error, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Parameter {
    /// Short code used in output filenames, e.g. `"CO"`.
    pub code: &'static str,
    /// Identifier the archive expects in the request body.
    pub identifier: &'static str,
    pub description: &'static str,
    pub unit: &'static str,
}

const fn p(
    code: &'static str,
    identifier: &'static str,
    description: &'static str,
    unit: &'static str,
) -> Parameter {
    Parameter {
        code,
        identifier,
        description,
        unit,
    }
}

#[derive(Debug)]
pub struct Catalog {
    archive: Archive,
    rows: &'static [Parameter],
}

impl Catalog {
    pub fn archive(&self) -> Archive {
        self.archive
    }

    /// Exact, case-sensitive lookup by parameter code.
    pub fn lookup(&self, code: &str) -> Result<&Parameter> {
        self.rows
            .iter()
            .find(|row| row.code == code)
            .ok_or_else(|| Error::MissingParameter {
                code: code.to_string(),
                archive: self.archive,
            })
    }

    pub fn contains(&self, code: &str) -> bool {
        self.rows.iter().any(|row| row.code == code)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Parameter> {
        self.rows.iter()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }
}

const FLUX: &str = "kg m-2 s-1";

pub static CDS_CATALOG: Catalog = Catalog {
    archive: Archive::Cds,
    rows: &[
        p("ABT", "altitude_of_plume_bottom", "Altitude of plume bottom", "m"),
        p("APT", "altitude_of_plume_top", "Altitude of plume top", "m"),
        p("MAMI", "mean_altitude_of_maximum_injection", "Mean altitude of maximum injection", "m"),
        p("INJH", "injection_height", "Injection height (from IS4FIRES)", "m"),
        p("CO2", "wildfire_flux_of_carbon_dioxide", "Carbon dioxide", FLUX),
        p("CO", "wildfire_flux_of_carbon_monoxide", "Carbon monoxide", FLUX),
        p("CH4", "wildfire_flux_of_methane", "Methane", FLUX),
        p("NHMC", "wildfire_flux_of_non_methane_hydrocarbons", "Non-methane hydrocarbons", FLUX),
        p("H2", "wildfire_flux_of_hydrogen", "Hydrogen", FLUX),
        p("NOx", "wildfire_flux_of_nitrogen_oxides", "Nitrogen oxides", FLUX),
        p("N2O", "wildfire_flux_of_nitrous_oxide", "Nitrous oxide", FLUX),
        p("PM2p5", "wildfire_flux_of_particulate_matter_d_2_5_µm", "Particulate matter PM2.5", FLUX),
        p("TPM", "wildfire_flux_of_total_particulate_matter", "Total particulate matter", FLUX),
        p("TC", "wildfire_flux_of_total_carbon_in_aerosols", "Total carbon in aerosols", FLUX),
        p("OC", "wildfire_flux_of_organic_carbon", "Organic carbon", FLUX),
        p("BC", "wildfire_flux_of_black_carbon", "Black carbon", FLUX),
        p("C", "wildfire_overall_flux_of_burnt_carbon", "Burnt carbon", FLUX),
        p("CR", "wildfire_combustion_rate", "Combustion rate", FLUX),
        p("SO2", "wildfire_flux_of_sulphur_dioxide", "Sulfur dioxide", FLUX),
        p("CH3OH", "wildfire_flux_of_methanol", "Methanol", FLUX),
        p("C2H5OH", "wildfire_flux_of_ethanol", "Ethanol", FLUX),
        p("C3H8", "wildfire_flux_of_propane", "Propane", FLUX),
        p("C2H4", "wildfire_flux_of_ethene", "Ethene", FLUX),
        p("C3H6", "wildfire_flux_of_propene", "Propene", FLUX),
        p("C5H8", "wildfire_flux_of_isoprene", "Isoprene", FLUX),
        p("Terpenes", "wildfire_flux_of_terpenes", "Terpenes (C5H8)n", FLUX),
        p("Toulene", "wildfire_flux_of_toluene_lump", "Toluene lump (C7H8 + C6H6 + C8H10)", FLUX),
        p("HiAlkenes", "wildfire_flux_of_higher_alkenes", "Higher alkenes (CnH2n, C>=4)", FLUX),
        p("HiAlkanes", "wildfire_flux_of_higher_alkanes", "Higher alkanes (CnH2n+2, C>=4)", FLUX),
        p("CH2O", "wildfire_flux_of_formaldehyde", "Formaldehyde", FLUX),
        p("C2H4O", "wildfire_flux_of_acetaldehyde", "Acetaldehyde", FLUX),
        p("C3H6O", "wildfire_flux_of_acetone", "Acetone", FLUX),
        p("NH3", "wildfire_flux_of_ammonia", "Ammonia", FLUX),
        p("C2H6S", "wildfire_flux_of_dimethyl_sulfide", "Dimethyl sulfide (DMS)", FLUX),
        p("C2H6", "wildfire_flux_of_ethane", "Ethane", FLUX),
        p("C7H8", "wildfire_flux_of_toluene", "Toluene", FLUX),
        p("C6H6", "wildfire_flux_of_benzene", "Benzene", FLUX),
        p("C8H10", "wildfire_flux_of_xylene", "Xylene", FLUX),
        p("C4H8", "wildfire_flux_of_butenes", "Butene", FLUX),
        p("C5H10", "wildfire_flux_of_pentenes", "Pentene", FLUX),
        p("C6H12", "wildfire_flux_of_hexene", "Hexene", FLUX),
        p("C8H16", "wildfire_flux_of_octene", "Octene", FLUX),
        p("C4H10", "wildfire_flux_of_butanes", "Butane", FLUX),
        p("C5H12", "wildfire_flux_of_pentanes", "Pentane", FLUX),
        p("C6H14", "wildfire_flux_of_hexanes", "Hexane", FLUX),
        p("C7H16", "wildfire_flux_of_heptane", "Heptane", FLUX),
        p("OFF", "wildfire_fraction_of_area_observed", "Fraction of area observed", "dimensionless"),
        p("FRP", "wildfire_radiative_power", "Fire radiative power", "W m-2"),
    ],
};

pub static MARS_CATALOG: Catalog = Catalog {
    archive: Archive::Mars,
    rows: &[
        p("MAMI", "119.210", "Mean altitude of maximum injection", "m"),
        p("APT", "120.210", "Altitude of plume top", "m"),
        p("CO2", "80.210", "Carbon dioxide", FLUX),
        p("CO", "81.210", "Carbon monoxide", FLUX),
        p("CH4", "82.210", "Methane", FLUX),
        p("NHMC", "83.210", "Non-methane hydrocarbons", FLUX),
        p("H2", "84.210", "Hydrogen", FLUX),
        p("NOx", "85.210", "Nitrogen oxides", FLUX),
        p("N2O", "86.210", "Nitrous oxide", FLUX),
        p("PM2p5", "87.210", "Particulate matter PM2.5", FLUX),
        p("TPM", "88.210", "Total particulate matter", FLUX),
        p("TC", "89.210", "Total carbon in aerosols", FLUX),
        p("OC", "90.210", "Organic carbon", FLUX),
        p("BC", "91.210", "Black carbon", FLUX),
        p("C", "92.210", "Burnt carbon", FLUX),
        p("CR", "100.210", "Combustion rate", FLUX),
        p("SO2", "102.210", "Sulfur dioxide", FLUX),
        p("CH3OH", "103.210", "Methanol", FLUX),
        p("C2H5OH", "104.210", "Ethanol", FLUX),
        p("C3H8", "105.210", "Propane", FLUX),
        p("C2H4", "106.210", "Ethene", FLUX),
        p("C3H6", "107.210", "Propene", FLUX),
        p("C5H8", "108.210", "Isoprene", FLUX),
        p("Terpenes", "109.210", "Terpenes (C5H8)n", FLUX),
        p("Toulene", "110.210", "Toluene lump (C7H8 + C6H6 + C8H10)", FLUX),
        p("HiAlkenes", "111.210", "Higher alkenes (CnH2n, C>=4)", FLUX),
        p("HiAlkanes", "112.210", "Higher alkanes (CnH2n+2, C>=4)", FLUX),
        p("CH2O", "113.210", "Formaldehyde", FLUX),
        p("C2H4O", "114.210", "Acetaldehyde", FLUX),
        p("C3H6O", "115.210", "Acetone", FLUX),
        p("NH3", "116.210", "Ammonia", FLUX),
        p("C2H6S", "117.210", "Dimethyl sulfide (DMS)", FLUX),
        p("C2H6", "118.210", "Ethane", FLUX),
        p("C7H8", "231.210", "Toluene", FLUX),
        p("C6H6", "232.210", "Benzene", FLUX),
        p("C8H10", "233.210", "Xylene", FLUX),
        p("C4H8", "234.210", "Butene", FLUX),
        p("C5H10", "235.210", "Pentene", FLUX),
        p("C6H12", "236.210", "Hexene", FLUX),
        p("C8H16", "237.210", "Octene", FLUX),
        p("C4H10", "238.210", "Butane", FLUX),
        p("C5H12", "239.210", "Pentane", FLUX),
        p("C6H14", "240.210", "Hexane", FLUX),
        p("C7H16", "241.210", "Heptane", FLUX),
        p("VA", "79.210", "Viewing angle of observation", "degrees"),
        p("OFF", "97.210", "Fraction of area observed", "dimensionless"),
        p("NoFRP", "98.210", "Positive FRP pixels per grid cell", "count"),
        p("FRP", "99.210", "Fire radiative power", "W m-2"),
        p("MaxFRP", "101.210", "Maximum fire radiative power", "W"),
    ],
};
