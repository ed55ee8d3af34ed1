//! Bilingual stopword sets.
//!
//! English and Indonesian lists, selectable per corpus; the default language
//! setting uses the union of both.

use crate::config::Language;
use lazy_static::lazy_static;
use std::collections::HashSet;

lazy_static! {
    static ref ENGLISH: HashSet<&'static str> = {
        let words: &[&str] = &[
            "a","about","above","after","again","against","all","am","an","and","any","are","aren't","as","at",
            "be","because","been","before","being","below","between","both","but","by",
            "can","can't","cannot","could","couldn't",
            "did","didn't","do","does","doesn't","doing","don't","down","during",
            "each","few","for","from","further",
            "had","hadn't","has","hasn't","have","haven't","having","he","he'd","he'll","he's","her","here","here's","hers","herself","him","himself","his","how","how's",
            "i","i'd","i'll","i'm","i've","if","in","into","is","isn't","it","it's","its","itself",
            "let's","me","more","most","mustn't","my","myself",
            "no","nor","not","of","off","on","once","only","or","other","ought","our","ours","ourselves","out","over","own",
            "same","she","she'd","she'll","she's","should","shouldn't","so","some","such",
            "than","that","that's","the","their","theirs","them","themselves","then","there","there's","these","they","they'd","they'll","they're","they've","this","those","through","to","too",
            "under","until","up","very",
            "was","wasn't","we","we'd","we'll","we're","we've","were","weren't","what","what's","when","when's","where","where's","which","while","who","who's","whom","why","why's","with","won't","would","wouldn't",
            "you","you'd","you'll","you're","you've","your","yours","yourself","yourselves",
        ];
        words.iter().copied().collect()
    };
    static ref INDONESIAN: HashSet<&'static str> = {
        let words: &[&str] = &[
            "ada","adalah","adanya","adapun","agar","akan","akhirnya","aku","amat","anda","antar","antara",
            "antaranya","apa","apabila","apakah","apalagi","atas","atau","ataukah","ataupun","bagai","bagaimana",
            "bagi","bahkan","bahwa","baik","banyak","baru","bawah","beberapa","begini","begitu","belum","benar",
            "berada","berapa","berbagai","berikut","berikutnya","bersama","berupa","besar","biasa","biasanya",
            "bila","bisa","boleh","buat","bukan","bukankah","bukanlah","bulan","cara","cukup","cuma","dahulu",
            "dalam","dan","dapat","dari","daripada","datang","dekat","demi","demikian","dengan","depan","di",
            "dia","diantara","diantaranya","diberikan","dibuat","digunakan","dilakukan","dimaksud","diminta",
            "dimulai","dini","diri","dirinya","disebut","disini","ditanyakan","dong","dua","dulu","empat",
            "enggak","entah","guna","hal","hampir","hanya","hari","harus","haruslah","harusnya","hendak",
            "hingga","ia","ialah","ibarat","ikut","ingin","ini","inilah","itu","itulah","jadi","jadilah",
            "jangan","jauh","jelas","jika","jikalau","juga","jumlah","justru","kala","kalau","kalian","kami",
            "kamu","kan","kapan","karena","karenanya","kata","ke","keadaan","kecil","kedua","keduanya","keluar",
            "kembali","kemudian","kemungkinan","kenapa","kepada","kepadanya","keseluruhan","ketika","khususnya",
            "kini","kita","kurang","lagi","lain","lainnya","lalu","lama","lanjut","lebih","lewat","lima","luar",
            "macam","maka","makanya","makin","malah","mampu","mana","manakala","masa","masalah","masih","masing",
            "mau","maupun","melainkan","melakukan","melalui","melihat","memang","memberi","memberikan","membuat",
            "memiliki","mempunyai","menjadi","menuju","menurut","mereka","merupakan","meski","meskipun","minta",
            "misal","misalnya","mulai","mungkin","nah","namun","nanti","nyaris","oleh","olehnya","pada","padahal",
            "padanya","paling","para","pasti","penting","per","perlu","pernah","pertama","pula","pun","saat",
            "saatnya","saja","salah","sama","sambil","sampai","sana","sangat","satu","saya","se","sebab",
            "sebagai","sebagaimana","sebagian","sebanyak","sebelum","sebelumnya","sebenarnya","seberapa","sebuah",
            "secara","sedang","sedangkan","sedikit","segera","sehingga","sejak","sejumlah","sekali","sekarang",
            "sekitar","selain","selalu","selama","seluruh","semacam","semakin","sementara","semua","semuanya",
            "sendiri","seolah","seorang","sepanjang","seperti","sering","serta","sesuatu","sesudah","setelah",
            "setiap","seusai","sewaktu","siapa","sini","suatu","sudah","supaya","tadi","tahu","tahun","tak",
            "tanpa","tanya","tapi","telah","tentang","tentu","tentunya","terdiri","terhadap","terjadi","terlalu",
            "ternyata","tersebut","tertentu","tetap","tetapi","tiap","tidak","tiga","toh","untuk","usah","wah",
            "waktu","walau","walaupun","yaitu","yakni","yang",
        ];
        words.iter().copied().collect()
    };
}

/// Whether a lowercased token is a stopword for the given language setting.
pub fn is_stopword(token: &str, language: Language) -> bool {
    match language {
        Language::English => ENGLISH.contains(token),
        Language::Indonesian => INDONESIAN.contains(token),
        Language::Combined => ENGLISH.contains(token) || INDONESIAN.contains(token),
    }
}
