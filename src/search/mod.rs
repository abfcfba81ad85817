pub mod refine;
pub mod substitution;
pub mod transposition;

pub use self::refine::{hill_climb_columnar, RefineOptions};
pub use self::substitution::{
    column_fitness, rank_column_symbols, recover_keys, KeyRecovery, KeyRecoveryOptions,
    RecoveredKey,
};
pub use self::transposition::{
    decrypt_columnar, encrypt_columnar, positional_crib_bonus, search_columnar,
    search_with_multiple_cribs_positions, sweep_columns, PositionalCribs, Route,
    TranspositionOptions,
};
