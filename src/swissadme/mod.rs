use serde::{Deserialize, Serialize};

pub mod extractor;
pub mod session;
pub mod worker;

pub const COMPOUND_COLUMN: &str = "Compound";
pub const SMILES_COLUMN: &str = "SMILES";

/// Column order of every result file this crate writes.
pub const REPORT_COLUMNS: [&str; 10] = [
    COMPOUND_COLUMN,
    SMILES_COLUMN,
    "Molecular_Formula",
    "Molecular_Weight",
    "MLogP",
    "TPSA",
    "H_Bond_Acceptors",
    "H_Bond_Donors",
    "Lipinski_Filter",
    "Bioavailability_Score",
];

/// The labeled SwissADME fields we harvest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Property {
    MolecularFormula,
    MolecularWeight,
    MLogP,
    Tpsa,
    HBondAcceptors,
    HBondDonors,
    LipinskiFilter,
    BioavailabilityScore,
}

impl Property {
    pub const ALL: [Property; 8] = [
        Property::MolecularFormula,
        Property::MolecularWeight,
        Property::MLogP,
        Property::Tpsa,
        Property::HBondAcceptors,
        Property::HBondDonors,
        Property::LipinskiFilter,
        Property::BioavailabilityScore,
    ];

    /// Text of the table cell that precedes the value on the results page.
    pub fn label(&self) -> &'static str {
        match self {
            Property::MolecularFormula => "Formula",
            Property::MolecularWeight => "Molecular weight",
            Property::MLogP => "Log Po/w (MLOGP)",
            Property::Tpsa => "TPSA",
            Property::HBondAcceptors => "Num. H-bond acceptors",
            Property::HBondDonors => "Num. H-bond donors",
            Property::LipinskiFilter => "Lipinski",
            Property::BioavailabilityScore => "Bioavailability Score",
        }
    }

    pub fn column(&self) -> &'static str {
        match self {
            Property::MolecularFormula => "Molecular_Formula",
            Property::MolecularWeight => "Molecular_Weight",
            Property::MLogP => "MLogP",
            Property::Tpsa => "TPSA",
            Property::HBondAcceptors => "H_Bond_Acceptors",
            Property::HBondDonors => "H_Bond_Donors",
            Property::LipinskiFilter => "Lipinski_Filter",
            Property::BioavailabilityScore => "Bioavailability_Score",
        }
    }
}

/// One row of harvested data. `compound` and `smiles` are always present; every
/// extracted field stays `None` until the page yields it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractionResult {
    #[serde(rename = "Compound")]
    pub compound: String,
    #[serde(rename = "SMILES")]
    pub smiles: String,
    #[serde(rename = "Molecular_Formula")]
    pub molecular_formula: Option<String>,
    #[serde(rename = "Molecular_Weight")]
    pub molecular_weight: Option<String>,
    #[serde(rename = "MLogP")]
    pub mlogp: Option<String>,
    #[serde(rename = "TPSA")]
    pub tpsa: Option<String>,
    #[serde(rename = "H_Bond_Acceptors")]
    pub h_bond_acceptors: Option<String>,
    #[serde(rename = "H_Bond_Donors")]
    pub h_bond_donors: Option<String>,
    #[serde(rename = "Lipinski_Filter")]
    pub lipinski_filter: Option<String>,
    #[serde(rename = "Bioavailability_Score")]
    pub bioavailability_score: Option<String>,
}

impl ExtractionResult {
    pub fn new(compound: impl Into<String>, smiles: impl Into<String>) -> Self {
        Self {
            compound: compound.into(),
            smiles: smiles.into(),
            molecular_formula: None,
            molecular_weight: None,
            mlogp: None,
            tpsa: None,
            h_bond_acceptors: None,
            h_bond_donors: None,
            lipinski_filter: None,
            bioavailability_score: None,
        }
    }

    fn slot(&mut self, property: Property) -> &mut Option<String> {
        match property {
            Property::MolecularFormula => &mut self.molecular_formula,
            Property::MolecularWeight => &mut self.molecular_weight,
            Property::MLogP => &mut self.mlogp,
            Property::Tpsa => &mut self.tpsa,
            Property::HBondAcceptors => &mut self.h_bond_acceptors,
            Property::HBondDonors => &mut self.h_bond_donors,
            Property::LipinskiFilter => &mut self.lipinski_filter,
            Property::BioavailabilityScore => &mut self.bioavailability_score,
        }
    }

    pub fn get(&self, property: Property) -> Option<&str> {
        let value = match property {
            Property::MolecularFormula => &self.molecular_formula,
            Property::MolecularWeight => &self.molecular_weight,
            Property::MLogP => &self.mlogp,
            Property::Tpsa => &self.tpsa,
            Property::HBondAcceptors => &self.h_bond_acceptors,
            Property::HBondDonors => &self.h_bond_donors,
            Property::LipinskiFilter => &self.lipinski_filter,
            Property::BioavailabilityScore => &self.bioavailability_score,
        };
        value.as_deref()
    }

    pub fn set(&mut self, property: Property, value: Option<String>) {
        *self.slot(property) = value;
    }

    pub fn extracted_count(&self) -> usize {
        Property::ALL
            .iter()
            .filter(|p| self.get(**p).is_some())
            .count()
    }

    pub fn is_complete(&self) -> bool {
        self.extracted_count() == Property::ALL.len()
    }
}
