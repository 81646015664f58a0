// 🎈 Decorations - providers and the packages they sell

use serde::Serialize;

// ============================================================================
// PROVIDERS
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DecorationProvider {
    pub id: &'static str,
    pub name: &'static str,
    pub contact: &'static str,
}

pub const PROVIDERS: &[DecorationProvider] = &[
    DecorationProvider {
        id: "flores-del-valle",
        name: "Flores del Valle",
        contact: "ventas@floresdelvalle.pe",
    },
    DecorationProvider {
        id: "globos-fiesta",
        name: "Globos & Fiesta",
        contact: "pedidos@globosfiesta.pe",
    },
    DecorationProvider {
        id: "luz-y-ambiente",
        name: "Luz y Ambiente",
        contact: "eventos@luzyambiente.pe",
    },
];

// ============================================================================
// PACKAGES
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DecorationPackage {
    pub id: &'static str,
    pub provider_id: &'static str,
    pub name: &'static str,
    pub price: f64,
    pub includes: &'static [&'static str],
}

pub const PACKAGES: &[DecorationPackage] = &[
    DecorationPackage {
        id: "floral-basico",
        provider_id: "flores-del-valle",
        name: "Floral Básico",
        price: 450.0,
        includes: &["10 centros de mesa", "arco de entrada"],
    },
    DecorationPackage {
        id: "floral-premium",
        provider_id: "flores-del-valle",
        name: "Floral Premium",
        price: 1200.0,
        includes: &["20 centros de mesa", "arco de entrada", "bouquet", "pétalos de pasillo"],
    },
    DecorationPackage {
        id: "globos-infantil",
        provider_id: "globos-fiesta",
        name: "Fiesta Infantil",
        price: 300.0,
        includes: &["columnas de globos", "letrero con nombre"],
    },
    DecorationPackage {
        id: "globos-corporativo",
        provider_id: "globos-fiesta",
        name: "Corporativo",
        price: 520.0,
        includes: &["arco con colores de marca", "backing para fotos"],
    },
    DecorationPackage {
        id: "iluminacion-calida",
        provider_id: "luz-y-ambiente",
        name: "Iluminación Cálida",
        price: 800.0,
        includes: &["guirnaldas de luces", "velas LED", "luz de pista"],
    },
];

pub fn find_provider(id: &str) -> Option<&'static DecorationProvider> {
    PROVIDERS.iter().find(|p| p.id == id)
}

pub fn find_package(id: &str) -> Option<&'static DecorationPackage> {
    PACKAGES.iter().find(|p| p.id == id)
}

pub fn packages_for_provider(provider_id: &str) -> Vec<&'static DecorationPackage> {
    PACKAGES
        .iter()
        .filter(|p| p.provider_id == provider_id)
        .collect()
}

/// Package price, or `default` when the package id is unknown
pub fn package_price_or_default(id: &str, default: f64) -> f64 {
    find_package(id).map(|p| p.price).unwrap_or(default)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_package_has_a_provider() {
        for package in PACKAGES {
            assert!(
                find_provider(package.provider_id).is_some(),
                "package {} points to unknown provider {}",
                package.id,
                package.provider_id
            );
        }
    }

    #[test]
    fn test_find_and_defaults() {
        let package = find_package("floral-premium").unwrap();
        assert_eq!(package.name, "Floral Premium");
        assert_eq!(package.includes.len(), 4);

        assert!(find_package("unknown").is_none());
        assert_eq!(package_price_or_default("globos-infantil", 0.0), 300.0);
        assert_eq!(package_price_or_default("unknown", 99.0), 99.0);
    }

    #[test]
    fn test_packages_for_provider() {
        let packages = packages_for_provider("flores-del-valle");
        let ids: Vec<&str> = packages.iter().map(|p| p.id).collect();
        assert_eq!(ids, vec!["floral-basico", "floral-premium"]);

        assert!(packages_for_provider("nobody").is_empty());
    }
}
