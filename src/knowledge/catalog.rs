//! Crop-Health Catalog
//!
//! Fixed set of entries used to seed an empty knowledge base.

use crate::vector::Record;

/// A seed entry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CatalogEntry {
    pub id: &'static str,
    pub category: &'static str,
    pub text: &'static str,
}

impl CatalogEntry {
    pub fn to_record(&self) -> Record {
        Record::new(self.id, self.text).with_field("category", self.category)
    }
}

pub const CATALOG: &[CatalogEntry] = &[
    // Tomato diseases
    CatalogEntry {
        id: "K001",
        category: "tomato_disease",
        text: "Tomato Early Blight is caused by the fungus Alternaria solani. Symptoms include dark brown spots with concentric rings on older leaves. Treatment: Remove infected leaves, apply copper-based fungicides, ensure proper spacing for air circulation.",
    },
    CatalogEntry {
        id: "K002",
        category: "tomato_disease",
        text: "Tomato Late Blight is caused by Phytophthora infestans. Symptoms include water-soaked lesions on leaves and stems, white mold on undersides. Treatment: Apply fungicides immediately, remove infected plants, avoid overhead watering.",
    },
    CatalogEntry {
        id: "K003",
        category: "tomato_disease",
        text: "Tomato Bacterial Spot is caused by Xanthomonas bacteria. Symptoms include small dark spots on leaves and fruit. Treatment: Use copper sprays, practice crop rotation, use disease-free seeds.",
    },
    CatalogEntry {
        id: "K004",
        category: "tomato_disease",
        text: "Tomato Leaf Mold is caused by Passalora fulva fungus. Symptoms include pale green to yellow spots on upper leaf surfaces. Treatment: Improve air circulation, reduce humidity, apply fungicides.",
    },
    CatalogEntry {
        id: "K005",
        category: "tomato_disease",
        text: "Tomato Septoria Leaf Spot appears as small circular spots with dark borders and gray centers. Treatment: Remove infected leaves, apply fungicides, mulch around plants to prevent soil splash.",
    },
    CatalogEntry {
        id: "K006",
        category: "tomato_disease",
        text: "Tomato Mosaic Virus causes mottled light and dark green patterns on leaves. No cure exists. Prevention: Use resistant varieties, control aphids, remove infected plants immediately.",
    },
    // Potato diseases
    CatalogEntry {
        id: "K007",
        category: "potato_disease",
        text: "Potato Early Blight shows similar symptoms to tomato. Dark lesions with target-like patterns. Prevention: Crop rotation, resistant varieties, fungicide application.",
    },
    CatalogEntry {
        id: "K008",
        category: "potato_disease",
        text: "Potato Late Blight causes rapid blackening and decay of leaves and tubers. This is the same disease that caused the Irish Potato Famine. Treatment: Preventive fungicide sprays, destroy infected plants.",
    },
    // General plant issues
    CatalogEntry {
        id: "K009",
        category: "plant_issue",
        text: "Yellow leaves (chlorosis) can indicate nitrogen deficiency, overwatering, or root damage. Solution: Check soil drainage, apply balanced fertilizer, inspect roots for rot.",
    },
    CatalogEntry {
        id: "K010",
        category: "plant_issue",
        text: "Brown leaf edges or tips often result from water stress, fertilizer burn, or low humidity. Solution: Adjust watering schedule, dilute fertilizers, increase humidity for sensitive plants.",
    },
    CatalogEntry {
        id: "K011",
        category: "plant_issue",
        text: "Red or purple leaves can indicate phosphorus deficiency or cold stress. Solution: Add phosphorus-rich fertilizer, protect plants from cold temperatures.",
    },
    CatalogEntry {
        id: "K012",
        category: "plant_issue",
        text: "Wilting plants may suffer from root rot, underwatering, or vascular diseases. Check soil moisture and roots. If roots are brown and mushy, it's root rot - improve drainage.",
    },
    // Pests
    CatalogEntry {
        id: "K013",
        category: "pest",
        text: "Aphids are small soft-bodied insects that suck plant sap. Control: Spray with water, use insecticidal soap, introduce ladybugs as natural predators.",
    },
    CatalogEntry {
        id: "K014",
        category: "pest",
        text: "Spider mites cause tiny yellow spots and fine webbing. Control: Increase humidity, spray with water, use miticides if severe.",
    },
    CatalogEntry {
        id: "K015",
        category: "pest",
        text: "Caterpillars and worms eat leaves and fruit. Control: Hand-pick, use Bt (Bacillus thuringiensis), cover plants with row covers.",
    },
    // General care
    CatalogEntry {
        id: "K016",
        category: "care",
        text: "Healthy crop maintenance: Ensure proper watering (avoid overwatering), adequate sunlight (6-8 hours daily), balanced fertilization, regular monitoring for pests and diseases.",
    },
    CatalogEntry {
        id: "K017",
        category: "care",
        text: "Crop rotation helps prevent soil-borne diseases and pest buildup. Rotate plant families every 2-3 years. Don't plant tomatoes where tomatoes, potatoes, or peppers grew recently.",
    },
    CatalogEntry {
        id: "K018",
        category: "care",
        text: "Proper plant spacing improves air circulation, reducing fungal diseases. Follow recommended spacing for each crop type. Overcrowding invites disease.",
    },
    // Fungal diseases
    CatalogEntry {
        id: "K019",
        category: "fungal_disease",
        text: "Powdery mildew appears as white powdery coating on leaves. Thrives in humid conditions with poor air flow. Treatment: Improve ventilation, apply sulfur or neem oil, remove infected leaves.",
    },
    CatalogEntry {
        id: "K020",
        category: "fungal_disease",
        text: "Rust diseases cause orange or brown pustules on leaf undersides. Treatment: Remove infected leaves, apply fungicides, ensure good air circulation.",
    },
    // Soil and nutrition
    CatalogEntry {
        id: "K021",
        category: "soil",
        text: "Soil pH affects nutrient availability. Most vegetables prefer pH 6.0-7.0. Test soil annually. Adjust with lime (to raise pH) or sulfur (to lower pH).",
    },
    CatalogEntry {
        id: "K022",
        category: "soil",
        text: "Nitrogen deficiency shows as yellowing of older leaves first. Solution: Apply nitrogen-rich fertilizer like blood meal, fish emulsion, or compost.",
    },
    CatalogEntry {
        id: "K023",
        category: "soil",
        text: "Blossom end rot (dark sunken spots on tomatoes/peppers) indicates calcium deficiency, often from irregular watering. Solution: Maintain consistent moisture, add calcium if soil test confirms deficiency.",
    },
];
