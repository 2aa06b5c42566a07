// Stop-word lists for keyword extraction
//
// Tokens of two characters or fewer are dropped before these lists are
// consulted, so very short function words are omitted.

/// English stop words
pub(crate) const ENGLISH: &[&str] = &[
    "the", "and", "for", "are", "but", "not", "you", "all", "can", "had", "her", "was", "one",
    "our", "out", "has", "him", "his", "how", "its", "did", "that", "this", "with", "have",
    "from", "they", "will", "would", "there", "their", "what", "which", "when", "where", "who",
    "whom", "why", "about", "into", "than", "then", "them", "these", "those", "some", "such",
    "only", "other", "more", "most", "over", "under", "again", "also", "just", "very", "been",
    "being", "were", "does", "each", "both", "between", "after", "before", "while", "should",
    "could", "may", "might", "must", "shall", "here", "any", "your", "yours", "ours", "because",
    "through", "during", "above", "below", "off", "once", "too", "own", "same", "now",
];

/// Portuguese stop words
pub(crate) const PORTUGUESE: &[&str] = &[
    "que", "não", "nao", "uma", "com", "por", "para", "mas", "como", "mais", "dos", "das",
    "seu", "sua", "seus", "suas", "foi", "ser", "tem", "têm", "são", "sao", "nos", "nas",
    "ele", "ela", "eles", "elas", "este", "esta", "isto", "isso", "esse", "essa", "esses",
    "essas", "aquele", "aquela", "pelo", "pela", "pelos", "pelas", "até", "ate", "sem",
    "sobre", "entre", "depois", "antes", "quando", "muito", "muita", "muitos", "muitas",
    "também", "tambem", "já", "onde", "ainda", "mesmo", "mesma", "cada", "qual", "quais",
    "outro", "outra", "outros", "outras", "meu", "minha", "nosso", "nossa", "você", "voce",
    "vocês", "voces", "era", "eram", "ter", "seja", "está", "estão", "estao", "estava",
    "foram", "será", "sera", "todo", "toda", "todos", "todas", "bem", "aqui", "ali",
    "assim", "então", "entao", "porque", "pois", "nem", "num", "numa", "uns", "umas",
    "vez", "vezes",
];
