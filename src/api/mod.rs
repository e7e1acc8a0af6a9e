// ============================================================================
// Module : api
// ============================================================================
// Fetch Adapter : récupère les données brutes depuis le fournisseur de
// marché. Aucune normalisation ici, voir le module normalize.
// ============================================================================

pub mod yahoo; // Client API Yahoo Finance

// Re-export de la fonction principale
pub use yahoo::fetch_history;
