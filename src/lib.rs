// ============================================================================
// SahamData - Library
// ============================================================================
// Expose les modules publics pour le binaire et les tests
// ============================================================================

pub mod api;       // Fetch Adapter Yahoo Finance
pub mod app;       // État de la session
pub mod error;     // Taxonomie d'erreurs
pub mod export;    // Export CSV
pub mod models;    // Structures de données
pub mod normalize; // Normaliseur de colonnes
pub mod ui;        // Interface utilisateur
