//! The fixed ancestry-component set written by the external estimator.

/// Component names of the K47 admixture model, the only keys accepted in
/// an ancestry record.
pub const ADMIXTURE_COMPONENTS: [&str; 47] = [
    "Kushitic",
    "North_Iberian",
    "East_Iberian",
    "Tibeto_Burman",
    "North_African",
    "South_Caucasian",
    "North_Caucasian",
    "Paleo_Balkan",
    "Turkic_Altai",
    "Proto_Austronesian",
    "Nilotic",
    "East_Med",
    "Omotic",
    "Munda",
    "North_Amerind",
    "Arabic",
    "East_Euro",
    "Central_African",
    "Andean",
    "Indo_Chinese",
    "South_Indian",
    "NE_Asian",
    "Volgan",
    "Mongolian",
    "Siberian",
    "North_Sea_Germanic",
    "Celtic",
    "West_African",
    "West_Finnic",
    "Uralic",
    "Sahelian",
    "NW_Indian",
    "East_African",
    "East_Asian",
    "Amuro_Manchurian",
    "Scando_Germanic",
    "Iranian",
    "South_African",
    "Amazonian",
    "Baltic",
    "Malay",
    "Meso_Amerind",
    "South_Chinese",
    "Papuan",
    "West_Med",
    "Pamirian",
    "Central_Med",
];

pub fn is_known_component(name: &str) -> bool {
    ADMIXTURE_COMPONENTS.contains(&name)
}
