// Word lists for incident names. Lowercase ASCII only.

pub(crate) const ADJECTIVES: &[&str] = &[
    "agile", "amber", "ancient", "autumn", "bold", "brave", "brisk", "bright", "calm", "clever",
    "cosmic", "crimson", "curious", "daring", "dusty", "eager", "early", "electric", "fancy",
    "fearless", "fierce", "frosty", "gentle", "gilded", "glad", "golden", "grand", "happy",
    "hidden", "humble", "icy", "jolly", "keen", "kind", "lively", "lucky", "lunar", "misty",
    "mellow", "nimble", "noble", "patient", "polar", "proud", "quick", "quiet", "rapid",
    "rusty", "shiny", "silent", "silver", "sleepy", "snowy", "solar", "steady", "stormy",
    "sunny", "swift", "tidy", "velvet", "vivid", "wandering", "wild", "windy", "wise", "witty",
    "young", "zesty",
];

pub(crate) const NOUNS: &[&str] = &[
    "albatross", "antelope", "badger", "beaver", "bison", "canyon", "cedar", "cheetah", "comet",
    "coyote", "crane", "dolphin", "eagle", "falcon", "ferret", "finch", "fjord", "gazelle",
    "glacier", "harbor", "hawk", "heron", "iguana", "jaguar", "kestrel", "koala", "lagoon",
    "lemur", "lynx", "magpie", "marmot", "meadow", "meteor", "moose", "narwhal", "nebula",
    "ocelot", "orca", "osprey", "otter", "panda", "pelican", "penguin", "puffin", "quokka",
    "raven", "reef", "river", "salmon", "sequoia", "sparrow", "squirrel", "summit", "tapir",
    "tiger", "toucan", "tundra", "valley", "walrus", "willow", "wombat", "yak", "zebra",
];
