//! Column names used by the dashboard pages.

// Facility identity and location.
pub const FACILITY: &str = "health_facility";
pub const SUBCOUNTY: &str = "subcountydivision";
pub const AUTHORITY: &str = "authority";
pub const DISTRICT: &str = "district";
pub const LATITUDE: &str = "latitude";
pub const LONGITUDE: &str = "longitude";
pub const YEAR: &str = "year";
pub const MONTH: &str = "month";

pub const AGYW_POPULATION: &str = "agyw_population";

// Reported indicators (health data).
pub const ANC1_TOTAL: &str = "anc1_total";
pub const ANC4_TOTAL: &str = "anc4_total";
pub const MATERNAL_DEATHS: &str = "maternal_deaths_total";
pub const NEWBORN_DEATHS: &str = "newborn_deaths_07_days";
pub const DELIVERIES: &str = "deliveries_total";
pub const PRETERM_BIRTHS: &str = "preterms_births_in_the_unit__total";
pub const LOW_BIRTH_WEIGHT: &str = "births_in_the_unit__live_births__25_kg";
pub const FP_INJECTABLE: &str = "fp_im_total";
pub const FP_PILLS: &str = "fp_pa_total";
pub const FP_IMPLANT_3Y: &str = "fp_implant3_total";
pub const FP_IMPLANT_5Y: &str = "fp_implant5_total";
pub const FP_IUD_T: &str = "fp_iudt_total";
pub const FP_IUD_H: &str = "fp_iudh_total";

/// Columns shown on the facility report, in display order.
pub const REPORT_COLUMNS: [&str; 13] = [
    ANC1_TOTAL,
    ANC4_TOTAL,
    MATERNAL_DEATHS,
    NEWBORN_DEATHS,
    DELIVERIES,
    PRETERM_BIRTHS,
    LOW_BIRTH_WEIGHT,
    FP_INJECTABLE,
    FP_PILLS,
    FP_IMPLANT_3Y,
    FP_IMPLANT_5Y,
    FP_IUD_T,
    FP_IUD_H,
];

// Model outputs (predicted data).
pub const PREDICTED_ANC: &str = "predicted_anc";
pub const PREDICTED_DELIVERIES: &str = "predicted_deliveries";
pub const PREDICTED_MATERNAL: &str = "predicted_maternal_adverse";
pub const PREDICTED_NEWBORN: &str = "predicted_newborn_adverse";
pub const PREDICTED_LOW_BIRTH_WEIGHT: &str = "predicted_lowbirthweight_adverse";
pub const PREDICTED_PRETERM: &str = "predicted_preterm_adverse";
