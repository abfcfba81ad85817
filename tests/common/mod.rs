#![allow(dead_code)]

use cipherforge::alphabet::normalize;
use cipherforge::config::ScoringWeights;
use cipherforge::scorer::{LanguageModel, LanguageModelBuilder, Scorer};
use std::sync::Arc;

// --- FIXTURE CORPUS ---
pub const ENGLISH_CORPUS: &str = "\
The river ran slowly past the old mill and the children sat on the bank to watch the \
water turn the great wheel. Their mother had told them to be home before the church \
clock struck six, but the evening was warm and the light over the fields was golden, \
and nobody wanted to leave. A man in a grey coat walked along the path with his dog, \
and he stopped to ask them whether they had seen a small boat drifting down from the \
north. They had not, and he thanked them and went on his way toward the bridge. \
When the clock finally rang the hour they ran across the meadow, jumping over the low \
stone wall and through the orchard where the apples were already beginning to fall. \
Their father was waiting at the gate with a lantern, and he laughed when he saw the mud \
on their boots. Dinner was bread and soup and a little cheese, and after the meal their \
mother read to them from a book about a sailor who had crossed the ocean alone. \
In the morning the weather changed. Heavy clouds came in from the east and the wind \
shook the windows of the house until the glass rattled in the frames. The children \
stayed inside and played cards by the fire while their father mended a chair in the \
kitchen. Later that afternoon the rain stopped, and they walked down to the river again \
to see how high the water had risen. The little bridge was almost covered, and the \
miller stood at his door watching the current with a worried face. He said that he had \
never seen the river so full in all the years he had lived beside it. \
That night there was a knock at the door. The man in the grey coat stood outside in the \
dark, and he asked if he might come in and rest for an hour. He told them that he had \
found the boat at last, caught among the reeds below the mill, and that inside it he had \
found a letter written many years ago by a woman who had lived in the valley when the \
mill was first built. The letter spoke of a hidden room beneath the floor of the old \
house on the hill, and of a promise that had never been kept. The children listened with \
wide eyes as he read it aloud by the light of the fire, and when he had finished nobody \
said a word for a long time. Their father asked him what he meant to do, and the man \
said that he would go up to the house in the morning and see for himself whether the \
story was true. The children begged to go with him, and after some discussion their \
mother agreed that they might, so long as they stayed close and did exactly as they \
were told.";

/// `len` letters of normalized corpus text starting at `offset` (clamped to fit).
pub fn plaintext_slice(offset: usize, len: usize) -> String {
    let letters = normalize(ENGLISH_CORPUS);
    let start = offset.min(letters.len().saturating_sub(len));
    letters[start..start + len.min(letters.len())].to_string()
}

pub fn english_model() -> Arc<LanguageModel> {
    Arc::new(
        LanguageModelBuilder::new()
            .with_corpus_text(ENGLISH_CORPUS)
            .with_crib_words(&["RIVER", "CLOCK", "NORTH", "EAST", "BRIDGE", "LETTER"])
            .build(),
    )
}

pub fn english_scorer() -> Scorer {
    Scorer::new(english_model(), ScoringWeights::default())
}

pub fn empty_scorer() -> Scorer {
    Scorer::new(
        Arc::new(LanguageModelBuilder::new().build()),
        ScoringWeights::default(),
    )
}

/// Length- and letter-preserving shuffle with a fixed seed.
pub fn shuffled(text: &str, seed: u64) -> String {
    let mut rng = fastrand::Rng::with_seed(seed);
    let mut bytes = text.as_bytes().to_vec();
    rng.shuffle(&mut bytes);
    String::from_utf8_lossy(&bytes).into_owned()
}
