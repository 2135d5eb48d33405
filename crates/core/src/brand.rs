/// Sentinel label for equipment whose vendor could not be determined.
pub const OTHER_BRAND: &str = "Outros";

/// Ordered keyword table scanned against the upper-cased equipment text.
/// First match wins, so model lines and sub-brands (IPHONE, REDMI, MOTO)
/// sit next to their parent entries and map to the parent label.
const BRAND_KEYWORDS: &[(&str, &str)] = &[
    ("SAMSUNG", "Samsung"),
    ("APPLE", "Apple"),
    ("IPHONE", "Apple"),
    ("IPAD", "Apple"),
    ("WATCH", "Apple"),
    ("XIAOMI", "Xiaomi"),
    ("REDMI", "Xiaomi"),
    ("POCO", "Xiaomi"),
    ("MOTOROLA", "Motorola"),
    ("MOTO", "Motorola"),
    ("LG", "Lg"),
    ("ASUS", "Asus"),
    ("DELL", "Dell"),
    ("HP", "Hp"),
    ("LENOVO", "Lenovo"),
    ("ACER", "Acer"),
    ("SONY", "Sony"),
    ("POSITIVO", "Positivo"),
];

/// Best-effort vendor extraction from a free-text equipment description.
/// Falls back to the `MODEL - BRAND - DETAIL` convention some reports
/// use, then to [`OTHER_BRAND`]. Always returns a label.
pub fn classify_brand(equipment: &str) -> String {
    if equipment.is_empty() {
        return OTHER_BRAND.to_string();
    }

    let upper = equipment.to_uppercase();
    for (keyword, label) in BRAND_KEYWORDS {
        if upper.contains(keyword) {
            return (*label).to_string();
        }
    }

    let parts: Vec<&str> = equipment.split('-').collect();
    if parts.len() >= 2 {
        let candidate = parts[1].trim();
        let len = candidate.chars().count();
        if (3..=14).contains(&len) {
            return title_case(candidate);
        }
    }

    OTHER_BRAND.to_string()
}

fn title_case(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + &chars.as_str().to_lowercase(),
        None => String::new(),
    }
}
