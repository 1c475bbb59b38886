//! Corpus fixtures shared by the integration tests.

#![allow(dead_code)]

use jisho_core::LexiconConfig;
use std::fs;
use std::path::Path;

pub const DICTIONARY: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<!DOCTYPE JMdict [
<!ELEMENT JMdict (entry*)>
<!ENTITY n "noun (common) (futsuumeishi)">
<!ENTITY uk "word usually written using kana alone">
<!ENTITY broken>
]>
<JMdict>
<entry>
<ent_seq>1</ent_seq>
<k_ele>
<keb>犬</keb>
<ke_pri>ichi1</ke_pri>
</k_ele>
<r_ele>
<reb>いぬ</reb>
</r_ele>
<sense>
<pos>&n;</pos>
<gloss>dog</gloss>
</sense>
</entry>
<entry>
<ent_seq>2</ent_seq>
<k_ele>
<keb>犬小屋</keb>
</k_ele>
<r_ele>
<reb>いぬごや</reb>
</r_ele>
<sense>
<pos>&n;</pos>
<gloss>kennel</gloss>
<gloss>doghouse</gloss>
</sense>
</entry>
<entry>
<ent_seq>3</ent_seq>
<k_ele>
<keb>猫</keb>
</k_ele>
<r_ele>
<reb>ねこ</reb>
</r_ele>
<sense>
<pos>&n;</pos>
<misc>&uk;</misc>
<gloss>cat</gloss>
</sense>
</entry>
</JMdict>
"#;

pub const CHARACTERS: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<kanjidic2>
<character>
<literal>語</literal>
<misc>
<stroke_count>14</stroke_count>
<freq>301</freq>
</misc>
<reading_meaning>
<rmgroup>
<reading r_type="ja_on">ゴ</reading>
<reading r_type="ja_kun">かた.る</reading>
<meaning>word</meaning>
<meaning m_lang="es">palabra</meaning>
</rmgroup>
</reading_meaning>
</character>
<character>
<literal>話</literal>
<misc>
<stroke_count>13</stroke_count>
<freq>134</freq>
</misc>
<reading_meaning>
<rmgroup>
<reading r_type="ja_on">ワ</reading>
<reading r_type="ja_kun">はな.す</reading>
<meaning>talk</meaning>
</rmgroup>
</reading_meaning>
</character>
<character>
<literal>工</literal>
<misc>
<stroke_count>3</stroke_count>
<freq>139</freq>
</misc>
<reading_meaning>
<rmgroup>
<reading r_type="ja_on">コウ</reading>
<meaning>craft</meaning>
</rmgroup>
</reading_meaning>
</character>
</kanjidic2>
"#;

pub const SENTENCES: &str = "1\t2\t犬が好きです。\tI like dogs.\t犬(いぬ)~ 好き{好き}~\n\
3\t4\t犬小屋を作った。\tI built a kennel.\t犬小屋~ 作る{作った}\n\
5\t6\t猫と犬。\tCats and dogs.\t猫 犬(いぬ)[01]{犬}~\n";

pub const SIMILARS: &str = "士/土/工/干\n語/話/\n";

pub const GO_DIAGRAM: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<svg xmlns="http://www.w3.org/2000/svg" xmlns:kvg="http://kanjivg.tagaini.net">
<g id="kvg:StrokePaths_08a9e">
<g id="kvg:08a9e" kvg:element="語">
  <g id="kvg:08a9e-g1" kvg:element="言" kvg:position="left"/>
  <g id="kvg:08a9e-g2" kvg:position="right">
    <g id="kvg:08a9e-g3" kvg:element="五"/>
    <g id="kvg:08a9e-g4" kvg:element="口"/>
  </g>
</g>
</g>
</svg>
"#;

pub const WA_DIAGRAM: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<svg xmlns="http://www.w3.org/2000/svg" xmlns:kvg="http://kanjivg.tagaini.net">
<g id="kvg:StrokePaths_08a71">
<g id="kvg:08a71" kvg:element="話">
  <g id="kvg:08a71-g1" kvg:element="言" kvg:position="left"/>
  <g id="kvg:08a71-g2" kvg:element="舌" kvg:position="right"/>
</g>
</g>
</svg>
"#;

/// Write every corpus in the default layout under `dir`.
pub fn write_corpora(dir: &Path) -> LexiconConfig {
    let config = LexiconConfig::with_data_dir(dir);

    write(&config.dictionary, DICTIONARY);
    write(&config.characters, CHARACTERS);
    write(&config.sentences, SENTENCES);
    write(&config.similars, SIMILARS);
    write(&config.diagrams.join("08a9e.svg"), GO_DIAGRAM);
    write(&config.diagrams.join("08a71.svg"), WA_DIAGRAM);

    config
}

pub fn write(path: &Path, content: &str) {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(path, content).unwrap();
}
